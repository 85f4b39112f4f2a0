use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct EmptyRequest {}

#[derive(Debug, Deserialize)]
pub struct NodeRequest {
    pub node: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct WindowRequest {
    pub hours: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PlantRequest {
    pub plant: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentParametersRequest {
    pub limit: Option<u32>,
    #[serde(default)]
    pub manual_only: bool,
}
