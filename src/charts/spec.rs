//! Declarative chart specifications
//!
//! A [`ChartSpec`] describes a single-view chart (mark, encodings, inline
//! data, size) and serializes to a Vega-Lite v5 document that the page hands
//! to `vega-embed`.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

use crate::charts::ChartConfig;

/// Vega-Lite schema the specs are written against
pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Graphical mark of a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Bar,
    Arc,
    /// Line, optionally with a point on every datum
    Line { point: bool },
}

impl Mark {
    fn to_json(self) -> Value {
        match self {
            Self::Bar => json!({ "type": "bar" }),
            Self::Arc => json!({ "type": "arc" }),
            Self::Line { point } => json!({ "type": "line", "point": point }),
        }
    }
}

/// Vega-Lite measurement type of an encoded field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Nominal,
    Ordinal,
    Quantitative,
}

/// Visual channel a field is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Channel {
    X,
    Y,
    Theta,
    Color,
}

impl Channel {
    const fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Theta => "theta",
            Self::Color => "color",
        }
    }
}

/// A field bound to a channel or tooltip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldEncoding {
    pub field: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<String>>,
}

impl FieldEncoding {
    #[must_use]
    pub fn new(field: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            field: field.into(),
            field_type,
            title: None,
            format: None,
            sort: None,
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Explicit category order along the axis
    #[must_use]
    pub fn sort(mut self, order: Vec<String>) -> Self {
        self.sort = Some(order);
        self
    }
}

/// A complete single-view chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub mark: Mark,
    pub encodings: Vec<(Channel, FieldEncoding)>,
    pub tooltip: Vec<FieldEncoding>,
    /// Inline data rows
    pub values: Vec<Value>,
    pub config: ChartConfig,
    /// Whether axis font sizes are configured; arcs have no axes
    pub axis_config: bool,
}

impl ChartSpec {
    /// An empty spec of the given mark
    #[must_use]
    pub fn new(mark: Mark, config: &ChartConfig) -> Self {
        Self {
            title: String::new(),
            mark,
            encodings: Vec::new(),
            tooltip: Vec::new(),
            values: Vec::new(),
            config: config.clone(),
            axis_config: !matches!(mark, Mark::Arc),
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn encode(mut self, channel: Channel, encoding: FieldEncoding) -> Self {
        self.encodings.retain(|(c, _)| *c != channel);
        self.encodings.push((channel, encoding));
        self
    }

    #[must_use]
    pub fn tooltip(mut self, fields: Vec<FieldEncoding>) -> Self {
        self.tooltip = fields;
        self
    }

    #[must_use]
    pub fn values(mut self, values: Vec<Value>) -> Self {
        self.values = values;
        self
    }

    /// The encoding bound to a channel
    #[must_use]
    pub fn encoding(&self, channel: Channel) -> Option<&FieldEncoding> {
        self.encodings
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, e)| e)
    }

    /// Render as a Vega-Lite document
    #[must_use]
    pub fn to_vega_lite(&self) -> Value {
        let mut encoding = Map::new();
        for (channel, field) in &self.encodings {
            encoding.insert(channel.name().to_string(), json!(field));
        }
        if !self.tooltip.is_empty() {
            encoding.insert("tooltip".to_string(), json!(self.tooltip));
        }

        let width = if self.config.use_container_width {
            json!("container")
        } else {
            json!(self.config.width)
        };

        let mut config = Map::new();
        if self.axis_config {
            config.insert(
                "axis".to_string(),
                json!({
                    "labelFontSize": self.config.axis_label_font_size,
                    "titleFontSize": self.config.axis_title_font_size,
                }),
            );
        }
        config.insert(
            "title".to_string(),
            json!({ "fontSize": self.config.title_font_size }),
        );

        json!({
            "$schema": VEGA_LITE_SCHEMA,
            "title": self.title,
            "width": width,
            "height": self.config.height,
            "data": { "values": self.values },
            "mark": self.mark.to_json(),
            "encoding": encoding,
            "config": config,
        })
    }
}

impl Serialize for ChartSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_vega_lite().serialize(serializer)
    }
}
