//! Code for shaping inputs into the JSON records the serving endpoint accepts

use crate::defaults::{HEIGHT, JPEG_QUALITY, WIDTH};
use crate::error::{PayloadError, Result};
use base64::{engine::general_purpose, Engine as _};
use image::imageops::FilterType;
use image::{DynamicImage, ImageOutputFormat};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::io::Cursor;

/// Key marking a record that is already in `dataframe_split` form
pub const DATAFRAME_SPLIT: &str = "dataframe_split";

/// Column name the image is sent under
pub const IMAGE_COLUMN: &str = "image";

/// A file uploaded to `/predict`. Lives for a single request
pub struct UploadedImage {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Debug for UploadedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "UploadedImage {{ filename: {:?}, bytes: <{} bytes> }}",
            self.filename,
            self.bytes.len()
        )
    }
}

/// Tabular input: parallel `columns` and row-major `data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataframeSplit {
    columns: Vec<String>,
    data: Vec<Vec<Value>>,
}

impl DataframeSplit {
    /// One column, one row
    pub fn single(column: impl Into<String>, value: Value) -> Self {
        DataframeSplit {
            columns: vec![column.into()],
            data: vec![vec![value]],
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn data(&self) -> &[Vec<Value>] {
        &self.data
    }
}

/// The record posted to the serving endpoint for an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServingPayload {
    dataframe_split: DataframeSplit,
}

impl ServingPayload {
    pub fn dataframe_split(&self) -> &DataframeSplit {
        &self.dataframe_split
    }

    /// The base64 JPEG carried by an image payload
    pub fn image(&self) -> Option<&str> {
        self.dataframe_split
            .data
            .first()
            .and_then(|row| row.first())
            .and_then(Value::as_str)
    }
}

/// Decode an image, force it to 8-bit RGB at 1000x720, and wrap the base64
/// JPEG as a single-cell `dataframe_split` record
#[tracing::instrument(skip_all, fields(len = bytes.len()))]
pub fn image_to_payload(bytes: &[u8]) -> Result<ServingPayload> {
    let img = image::load_from_memory(bytes)?;
    let img = match img {
        DynamicImage::ImageRgb8(_) => img,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    };
    let img = img.resize_exact(WIDTH, HEIGHT, FilterType::CatmullRom);

    let mut jpeg: Vec<u8> = Vec::new();
    img.write_to(&mut Cursor::new(&mut jpeg), ImageOutputFormat::Jpeg(JPEG_QUALITY))?;
    tracing::debug!("re-encoded image as {} byte jpeg", jpeg.len());

    let encoded = general_purpose::STANDARD.encode(&jpeg);
    Ok(ServingPayload {
        dataframe_split: DataframeSplit::single(IMAGE_COLUMN, Value::String(encoded)),
    })
}

/// Any input the gateway knows how to send
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Already a `dataframe_split` record, sent as-is
    RawSplit(Map<String, Value>),

    /// Named inputs, sent as `{"inputs": {name: [...]}}`
    NamedValues(BTreeMap<String, Vec<Value>>),

    /// A bare list, sent as `{"inputs": [...]}`
    ListValues(Vec<Value>),
}

impl Payload {
    /// Classify an arbitrary JSON value
    pub fn from_json(value: Value) -> std::result::Result<Payload, PayloadError> {
        match value {
            Value::Object(map) if map.contains_key(DATAFRAME_SPLIT) => Ok(Payload::RawSplit(map)),
            Value::Object(map) => map
                .into_iter()
                .map(|(name, value)| match value {
                    Value::Array(items) => Ok((name, items)),
                    _ => Err(PayloadError::NotListLike { name }),
                })
                .collect::<std::result::Result<BTreeMap<_, _>, _>>()
                .map(Payload::NamedValues),
            Value::Array(items) => Ok(Payload::ListValues(items)),
            other => Err(PayloadError::UnsupportedShape {
                kind: kind_of(&other),
            }),
        }
    }

    /// The JSON body to post upstream
    pub fn normalize(self) -> Value {
        match self {
            Payload::RawSplit(map) => Value::Object(map),
            Payload::NamedValues(inputs) => json!({ "inputs": inputs }),
            Payload::ListValues(inputs) => json!({ "inputs": inputs }),
        }
    }
}

/// Shape a generic JSON input for the serving endpoint. Records that already
/// carry `dataframe_split` are returned unchanged
pub fn normalize_generic_payload(data: Value) -> std::result::Result<Value, PayloadError> {
    Payload::from_json(data).map(Payload::normalize)
}

impl From<ServingPayload> for Payload {
    fn from(payload: ServingPayload) -> Payload {
        let DataframeSplit { columns, data } = payload.dataframe_split;
        let mut split = Map::new();
        split.insert(
            "columns".into(),
            Value::Array(columns.into_iter().map(Value::String).collect()),
        );
        split.insert(
            "data".into(),
            Value::Array(data.into_iter().map(Value::Array).collect()),
        );

        let mut map = Map::new();
        map.insert(DATAFRAME_SPLIT.into(), Value::Object(split));
        Payload::RawSplit(map)
    }
}

/// Non-finite floats become `null`
impl From<Vec<f64>> for Payload {
    fn from(values: Vec<f64>) -> Payload {
        Payload::ListValues(values.into_iter().map(Value::from).collect())
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<f64>)> for Payload {
    fn from_iter<I: IntoIterator<Item = (K, Vec<f64>)>>(iter: I) -> Payload {
        Payload::NamedValues(
            iter.into_iter()
                .map(|(name, values)| (name.into(), values.into_iter().map(Value::from).collect()))
                .collect(),
        )
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
