//! Serde model of a Lottie document.
//!
//! Only the document header, the asset table and markers are typed. Layer
//! content is carried as raw JSON since playback never inspects it.

pub mod model;
