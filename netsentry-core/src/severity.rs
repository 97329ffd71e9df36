use anyhow::Result;

/// Ordinal threat level: low < medium < high < critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    /// Fixed display color for charts and notification badges.
    pub fn color(&self) -> &'static str {
        match self {
            Severity::Critical => "#ef4444",
            Severity::High => "#f97316",
            Severity::Medium => "#eab308",
            Severity::Low => "#22c55e",
        }
    }

    /// Capitalized label for display ("Critical", "High", ...).
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(anyhow::anyhow!("Invalid severity: {}", s)),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Display color for a raw severity string as stored in the database.
/// Values outside the canonical four fall back to gray.
pub fn severity_color(raw: &str) -> &'static str {
    raw.parse::<Severity>()
        .map(|s| s.color())
        .unwrap_or("#6b7280")
}

/// Capitalize the first character of a raw severity string for display.
pub fn severity_label(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Alert triage status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    New,
    Investigating,
    Resolved,
    FalsePositive,
}

impl std::str::FromStr for AlertStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "new" => Ok(AlertStatus::New),
            "investigating" => Ok(AlertStatus::Investigating),
            "resolved" => Ok(AlertStatus::Resolved),
            "false_positive" => Ok(AlertStatus::FalsePositive),
            _ => Err(anyhow::anyhow!("Invalid alert status: {}", s)),
        }
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertStatus::New => write!(f, "new"),
            AlertStatus::Investigating => write!(f, "investigating"),
            AlertStatus::Resolved => write!(f, "resolved"),
            AlertStatus::FalsePositive => write!(f, "false_positive"),
        }
    }
}

/// Processing status of an uploaded network log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Pending,
    Processing,
    Processed,
    Failed,
}

impl std::str::FromStr for LogStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(LogStatus::Pending),
            "processing" => Ok(LogStatus::Processing),
            "processed" => Ok(LogStatus::Processed),
            "failed" => Ok(LogStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid log status: {}", s)),
        }
    }
}

impl std::fmt::Display for LogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogStatus::Pending => write!(f, "pending"),
            LogStatus::Processing => write!(f, "processing"),
            LogStatus::Processed => write!(f, "processed"),
            LogStatus::Failed => write!(f, "failed"),
        }
    }
}
