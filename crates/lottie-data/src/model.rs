use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LottieJson {
    #[serde(default)]
    pub v: Option<String>,
    #[serde(default)]
    pub nm: Option<String>,
    pub ip: f32,
    pub op: f32,
    pub fr: f32,
    pub w: u32,
    pub h: u32,
    #[serde(default)]
    pub ddd: Option<u8>,
    #[serde(default)]
    pub layers: Vec<serde_json::Value>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub markers: Vec<Marker>,
}

impl LottieJson {
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Asset {
    pub id: String,
    #[serde(default)]
    pub nm: Option<String>,
    #[serde(default)]
    pub layers: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub w: Option<u32>,
    #[serde(default)]
    pub h: Option<u32>,
    #[serde(default)]
    pub u: Option<String>, // Directory of the file
    #[serde(default)]
    pub p: Option<String>, // File name or data URI
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub e: Option<u8>, // 1 when `p` is embedded (data URI)
}

impl Asset {
    /// Image assets carry a path and no layers; precompositions carry layers.
    pub fn is_image(&self) -> bool {
        self.layers.is_none() && self.p.is_some()
    }
}

// Some exporters write `e` as a boolean instead of 0/1.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    Ok(match v {
        serde_json::Value::Bool(b) => Some(u8::from(b)),
        serde_json::Value::Number(n) => n.as_u64().map(|n| n.min(u8::MAX as u64) as u8),
        _ => None,
    })
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Marker {
    #[serde(default)]
    pub cm: Option<String>, // Comment, used as the marker name
    #[serde(default)]
    pub tm: Option<f32>, // Start frame
    #[serde(default)]
    pub dr: Option<f32>, // Duration in frames
}
