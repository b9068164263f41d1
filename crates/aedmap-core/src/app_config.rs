use crate::record::GeoPoint;

#[derive(Clone)]
pub struct AppConfig {
    pub airtable_api_key: String,
    pub airtable_base_id: String,
    pub airtable_table_name: String,
    pub airtable_api_url: String,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub locate_timeout_ms: u64,
    pub locate_max_age_ms: u64,
    pub emergency_number: String,
    pub report_update_url: Option<String>,
    /// Initial map centre handed to the map renderer.
    pub map_center: GeoPoint,
    pub map_zoom: u8,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("airtable_api_key", &"[redacted]")
            .field("airtable_base_id", &self.airtable_base_id)
            .field("airtable_table_name", &self.airtable_table_name)
            .field("airtable_api_url", &self.airtable_api_url)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("locate_timeout_ms", &self.locate_timeout_ms)
            .field("locate_max_age_ms", &self.locate_max_age_ms)
            .field("emergency_number", &self.emergency_number)
            .field("report_update_url", &self.report_update_url)
            .field("map_center", &self.map_center)
            .field("map_zoom", &self.map_zoom)
            .finish()
    }
}
