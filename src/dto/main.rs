use serde::Serialize;

/// Count and share of clients in one status.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusStat {
    pub status: &'static str,
    pub count: usize,
    /// Rounded to a whole percent; zero when there are no clients.
    pub percent: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardStats {
    pub total: usize,
    pub by_status: Vec<StatusStat>,
}

/// One entry of the recent activity feed.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecentActivity {
    pub cuid: String,
    pub name: String,
    pub action: &'static str,
    pub when: String,
}

/// Data required to render the dashboard template.
#[derive(Debug, Serialize)]
pub struct DashboardPageData {
    pub stats: DashboardStats,
    pub recent: Vec<RecentActivity>,
    /// Set when the admin API could not be read; the page still renders.
    pub error: Option<String>,
}
