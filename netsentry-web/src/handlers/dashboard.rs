use axum::{extract::State, response::Json};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use netsentry_core::dashboard::{
    self, AlertsOverTimePoint, AttackTypeCount, DashboardSnapshot, DashboardStats, RecentAlert,
    Series, SeverityCount, SystemHealth,
};
use netsentry_core::{severity_color, severity_label};
use sqlx::{Pool, Sqlite};

use crate::AppState;

pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(build_dashboard_snapshot(state.db.pool(), Utc::now()).await)
}

/// Build the full dashboard snapshot. Never fails: every aggregate group
/// is computed independently and degrades to zero counts or the fixed
/// placeholder series on query error or empty data.
pub async fn build_dashboard_snapshot(pool: &Pool<Sqlite>, now: DateTime<Utc>) -> DashboardSnapshot {
    let today = now.date_naive();

    DashboardSnapshot {
        stats: basic_stats(pool).await,
        attack_type_distribution: attack_type_distribution(pool, now).await,
        alerts_over_time: alerts_over_time(pool, today).await,
        severity_distribution: severity_distribution(pool).await,
        system_health: system_health(pool, today).await,
        recent_alerts: recent_alerts(pool).await,
    }
}

async fn count_rows(pool: &Pool<Sqlite>, sql: &str, what: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(sql)
        .fetch_one(pool)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to count {}: {}", what, e);
            0
        })
}

async fn basic_stats(pool: &Pool<Sqlite>) -> DashboardStats {
    DashboardStats {
        total_logs: count_rows(pool, "SELECT COUNT(*) FROM network_logs", "network logs").await,
        total_alerts: count_rows(pool, "SELECT COUNT(*) FROM alerts", "alerts").await,
        critical_alerts: count_rows(
            pool,
            "SELECT COUNT(*) FROM alerts WHERE severity = 'critical'",
            "critical alerts",
        )
        .await,
        pending_logs: count_rows(
            pool,
            "SELECT COUNT(*) FROM network_logs WHERE status = 'pending'",
            "pending logs",
        )
        .await,
        active_models: count_rows(pool, "SELECT COUNT(*) FROM ml_models", "models").await,
        total_users: count_rows(pool, "SELECT COUNT(*) FROM users", "users").await,
    }
}

async fn attack_type_distribution(
    pool: &Pool<Sqlite>,
    now: DateTime<Utc>,
) -> Series<AttackTypeCount> {
    let since = now - Duration::days(30);

    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT attack_type, COUNT(*) as count FROM alerts
         WHERE detected_at >= ?
         GROUP BY attack_type ORDER BY count DESC",
    )
    .bind(since)
    .fetch_all(pool)
    .await
    .unwrap_or_else(|e| {
        tracing::warn!("Failed to query attack type distribution: {}", e);
        Vec::new()
    });

    if rows.is_empty() {
        return Series::placeholder(dashboard::placeholder_attack_types());
    }

    Series::real(
        rows.into_iter()
            .map(|(name, value)| AttackTypeCount { name, value })
            .collect(),
    )
}

/// Count of alerts whose detected_at falls on the given calendar day.
async fn alerts_on_day(pool: &Pool<Sqlite>, day: NaiveDate) -> i64 {
    let start = day.and_hms_opt(0, 0, 0).expect("midnight exists").and_utc();
    let end = start + Duration::days(1);

    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM alerts WHERE detected_at >= ? AND detected_at < ?",
    )
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| {
        tracing::warn!("Failed to count alerts for {}: {}", day, e);
        0
    })
}

async fn alerts_over_time(pool: &Pool<Sqlite>, today: NaiveDate) -> Series<AlertsOverTimePoint> {
    let mut points = Vec::with_capacity(7);
    for day in dashboard::last_seven_days(today) {
        let count = alerts_on_day(pool, day).await;
        points.push(dashboard::day_point(day, count));
    }

    if points.iter().map(|p| p.count).sum::<i64>() == 0 {
        return Series::placeholder(dashboard::placeholder_alerts_over_time(today));
    }

    Series::real(points)
}

async fn severity_distribution(pool: &Pool<Sqlite>) -> Series<SeverityCount> {
    // Groups over whatever values are stored, not just the canonical four.
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT severity, COUNT(*) as count FROM alerts GROUP BY severity ORDER BY count DESC",
    )
    .fetch_all(pool)
    .await
    .unwrap_or_else(|e| {
        tracing::warn!("Failed to query severity distribution: {}", e);
        Vec::new()
    });

    if rows.is_empty() {
        return Series::placeholder(dashboard::placeholder_severity_distribution());
    }

    Series::real(
        rows.into_iter()
            .map(|(severity, count)| SeverityCount {
                color: severity_color(&severity).to_string(),
                severity: severity_label(&severity),
                count,
            })
            .collect(),
    )
}

async fn system_health(pool: &Pool<Sqlite>, today: NaiveDate) -> SystemHealth {
    let start = today.and_hms_opt(0, 0, 0).expect("midnight exists").and_utc();
    let end = start + Duration::days(1);

    let logs_processed_today = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM network_logs WHERE created_at >= ? AND created_at < ?",
    )
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| {
        tracing::warn!("Failed to count today's logs: {}", e);
        0
    });

    let alerts_today = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM alerts WHERE detected_at >= ? AND detected_at < ?",
    )
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| {
        tracing::warn!("Failed to count today's alerts: {}", e);
        0
    });

    SystemHealth {
        models_active: count_rows(pool, "SELECT COUNT(*) FROM ml_models", "models").await,
        logs_processed_today,
        alerts_today,
        avg_processing_time: dashboard::AVG_PROCESSING_TIME.to_string(),
    }
}

async fn recent_alerts(pool: &Pool<Sqlite>) -> Vec<RecentAlert> {
    type Row = (
        String,
        String,
        String,
        DateTime<Utc>,
        Option<String>,
        Option<String>,
    );

    let rows: Vec<Row> = sqlx::query_as(
        "SELECT a.id, a.attack_type, a.severity, a.detected_at, a.description, m.name as model_name
         FROM alerts a
         LEFT JOIN ml_models m ON a.ml_model_id = m.id
         ORDER BY a.detected_at DESC LIMIT 5",
    )
    .fetch_all(pool)
    .await
    .unwrap_or_else(|e| {
        tracing::warn!("Failed to query recent alerts: {}", e);
        Vec::new()
    });

    rows.into_iter()
        .map(
            |(id, attack_type, severity, detected_at, description, model_name)| RecentAlert {
                id,
                attack_type,
                severity,
                detected_at: detected_at.format("%Y-%m-%d %H:%M").to_string(),
                description,
                model_name: model_name.unwrap_or_else(|| "Unknown".to_string()),
            },
        )
        .collect()
}
