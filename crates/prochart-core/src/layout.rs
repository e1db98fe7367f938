//! Presentation state of a chart, kept apart from the compiled [`crate::ChartSpec`].
//!
//! [`LayoutModel`] owns a [`LayoutOptions`] value and publishes a [`LayoutEvent`] to every
//! subscriber after each effective mutation. Renderers subscribe once and re-flow from the
//! event; nothing here touches the data spec.

use crate::archetype::ChartArchetype;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_WIDTH: f64 = 300.0;
pub const MAX_WIDTH: f64 = 1200.0;
pub const MIN_HEIGHT: f64 = 200.0;
pub const MAX_HEIGHT: f64 = 800.0;

const DEFAULT_WIDTH: f64 = 800.0;
const DEFAULT_HEIGHT: f64 = 400.0;

pub fn clamp_width(px: f64) -> f64 {
    if px.is_finite() {
        px.clamp(MIN_WIDTH, MAX_WIDTH)
    } else {
        DEFAULT_WIDTH
    }
}

pub fn clamp_height(px: f64) -> f64 {
    if px.is_finite() {
        px.clamp(MIN_HEIGHT, MAX_HEIGHT)
    } else {
        DEFAULT_HEIGHT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HeightRepr", into = "HeightRepr")]
pub enum ChartHeight {
    /// Content-driven (tables).
    Auto,
    Px(f64),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum HeightRepr {
    Px(f64),
    Keyword(String),
}

impl TryFrom<HeightRepr> for ChartHeight {
    type Error = String;

    fn try_from(value: HeightRepr) -> Result<Self, Self::Error> {
        match value {
            HeightRepr::Px(px) => Ok(ChartHeight::Px(px)),
            HeightRepr::Keyword(k) if k.trim().eq_ignore_ascii_case("auto") => Ok(ChartHeight::Auto),
            HeightRepr::Keyword(k) => Err(format!("invalid height: {k}")),
        }
    }
}

impl From<ChartHeight> for HeightRepr {
    fn from(value: ChartHeight) -> Self {
        match value {
            ChartHeight::Auto => HeightRepr::Keyword("auto".to_string()),
            ChartHeight::Px(px) => HeightRepr::Px(px),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    None,
    Solid,
    Dashed,
    Dotted,
}

impl BorderStyle {
    /// SVG `stroke-dasharray`, if any.
    pub fn dash_array(self, width: f64) -> Option<String> {
        let w = width.max(1.0);
        match self {
            BorderStyle::Dashed => Some(format!("{} {}", w * 4.0, w * 2.0)),
            BorderStyle::Dotted => Some(format!("{w} {w}")),
            BorderStyle::None | BorderStyle::Solid => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub const fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    fn sanitized(self) -> Self {
        let fix = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            top: fix(self.top),
            right: fix(self.right),
            bottom: fix(self.bottom),
            left: fix(self.left),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Border {
    pub width: f64,
    pub style: BorderStyle,
    pub color: String,
    pub radius: f64,
}

impl Default for Border {
    fn default() -> Self {
        Self {
            width: 0.0,
            style: BorderStyle::None,
            color: "#dcdfe6".to_string(),
            radius: 0.0,
        }
    }
}

impl Border {
    pub fn is_visible(&self) -> bool {
        self.style != BorderStyle::None && self.width > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontStyle {
    pub family: String,
    pub size: f64,
    pub weight: u16,
    /// `None` follows the theme foreground.
    pub color: Option<String>,
}

impl Default for FontStyle {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            size: 12.0,
            weight: 400,
            color: None,
        }
    }
}

impl FontStyle {
    fn sized(size: f64, weight: u16) -> Self {
        Self {
            size,
            weight,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableStyle {
    pub header_background: String,
    /// Background of every other body row; `None` disables striping.
    pub stripe_background: Option<String>,
    pub border_color: String,
    pub border_width: f64,
    pub cell_padding: f64,
    pub header_font: FontStyle,
    pub cell_font: FontStyle,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header_background: "#f5f7fa".to_string(),
            stripe_background: Some("#fafafa".to_string()),
            border_color: "#ebeef5".to_string(),
            border_width: 1.0,
            cell_padding: 12.0,
            header_font: FontStyle::sized(14.0, 700),
            cell_font: FontStyle::sized(13.0, 400),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutOptions {
    pub width: f64,
    pub height: ChartHeight,
    pub alignment: Alignment,
    pub margin: Edges,
    pub padding: Edges,
    pub border: Border,
    /// `None` follows the theme background.
    pub background: Option<String>,
    pub title_font: FontStyle,
    pub label_font: FontStyle,
    pub show_legend: bool,
    pub table: TableStyle,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: ChartHeight::Px(DEFAULT_HEIGHT),
            alignment: Alignment::Center,
            margin: Edges::uniform(0.0),
            padding: Edges::uniform(16.0),
            border: Border::default(),
            background: None,
            title_font: FontStyle::sized(18.0, 700),
            label_font: FontStyle::default(),
            show_legend: true,
            table: TableStyle::default(),
        }
    }
}

impl LayoutOptions {
    /// Defaults with the height rule of `archetype` applied.
    pub fn for_archetype(archetype: ChartArchetype) -> Self {
        Self::default().normalized(archetype)
    }

    /// Clamps sizes into range and applies the height rule of `archetype`.
    pub fn normalized(mut self, archetype: ChartArchetype) -> Self {
        self.width = clamp_width(self.width);
        self.height = if archetype.has_auto_height() {
            ChartHeight::Auto
        } else {
            match self.height {
                ChartHeight::Auto => ChartHeight::Px(DEFAULT_HEIGHT),
                ChartHeight::Px(px) => ChartHeight::Px(clamp_height(px)),
            }
        };
        self.margin = self.margin.sanitized();
        self.padding = self.padding.sanitized();
        if !self.border.width.is_finite() || self.border.width < 0.0 {
            self.border.width = 0.0;
        }
        if !self.table.cell_padding.is_finite() || self.table.cell_padding < 0.0 {
            self.table.cell_padding = 0.0;
        }
        self
    }

    pub fn pixel_height(&self) -> Option<f64> {
        match self.height {
            ChartHeight::Auto => None,
            ChartHeight::Px(px) => Some(px),
        }
    }
}

/// What a mutation touched; renderers use it to skip work (tables ignore size changes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutChange {
    Width,
    Height,
    Alignment,
    Margin,
    Padding,
    Border,
    Background,
    TitleFont,
    LabelFont,
    Legend,
    Table,
    Archetype,
    Replaced,
}

impl LayoutChange {
    /// Whether the change can move chart geometry (as opposed to only restyling it).
    pub fn affects_geometry(self) -> bool {
        !matches!(self, LayoutChange::Background | LayoutChange::Border)
    }
}

#[derive(Debug)]
pub struct LayoutEvent<'a> {
    pub change: LayoutChange,
    pub revision: u64,
    pub archetype: ChartArchetype,
    pub options: &'a LayoutOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&LayoutEvent<'_>)>;

pub struct LayoutModel {
    options: LayoutOptions,
    archetype: ChartArchetype,
    /// Last explicit pixel height; survives switching to a table and back.
    pixel_height: f64,
    revision: u64,
    next_subscription: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
}

impl fmt::Debug for LayoutModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutModel")
            .field("options", &self.options)
            .field("archetype", &self.archetype)
            .field("revision", &self.revision)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Default for LayoutModel {
    fn default() -> Self {
        Self::new(ChartArchetype::Bar)
    }
}

impl LayoutModel {
    pub fn new(archetype: ChartArchetype) -> Self {
        Self {
            options: LayoutOptions::for_archetype(archetype),
            archetype,
            pixel_height: DEFAULT_HEIGHT,
            revision: 0,
            next_subscription: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn archetype(&self) -> ChartArchetype {
        self.archetype
    }

    /// Incremented on every published change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&LayoutEvent<'_>) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        before != self.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn set_archetype(&mut self, archetype: ChartArchetype) -> bool {
        if self.archetype == archetype {
            return false;
        }
        self.archetype = archetype;
        let mut next = self.options.clone();
        next.height = ChartHeight::Px(self.pixel_height);
        self.commit(LayoutChange::Archetype, next)
    }

    /// Width in pixels, clamped to `[300, 1200]`.
    pub fn set_width(&mut self, px: f64) -> bool {
        self.apply(LayoutChange::Width, |o| o.width = clamp_width(px))
    }

    /// Height in pixels, clamped to `[200, 800]`. Tables stay `auto`; the value is remembered for
    /// when the archetype changes back.
    pub fn set_height(&mut self, px: f64) -> bool {
        self.pixel_height = clamp_height(px);
        let h = self.pixel_height;
        self.apply(LayoutChange::Height, |o| o.height = ChartHeight::Px(h))
    }

    pub fn set_alignment(&mut self, alignment: Alignment) -> bool {
        self.apply(LayoutChange::Alignment, |o| o.alignment = alignment)
    }

    pub fn set_margin(&mut self, margin: Edges) -> bool {
        self.apply(LayoutChange::Margin, |o| o.margin = margin)
    }

    pub fn set_padding(&mut self, padding: Edges) -> bool {
        self.apply(LayoutChange::Padding, |o| o.padding = padding)
    }

    pub fn set_border(&mut self, border: Border) -> bool {
        self.apply(LayoutChange::Border, |o| o.border = border)
    }

    pub fn set_background(&mut self, background: Option<String>) -> bool {
        self.apply(LayoutChange::Background, |o| o.background = background)
    }

    pub fn set_title_font(&mut self, font: FontStyle) -> bool {
        self.apply(LayoutChange::TitleFont, |o| o.title_font = font)
    }

    pub fn set_label_font(&mut self, font: FontStyle) -> bool {
        self.apply(LayoutChange::LabelFont, |o| o.label_font = font)
    }

    pub fn set_show_legend(&mut self, show: bool) -> bool {
        self.apply(LayoutChange::Legend, |o| o.show_legend = show)
    }

    pub fn set_table_style(&mut self, table: TableStyle) -> bool {
        self.apply(LayoutChange::Table, |o| o.table = table)
    }

    /// Replaces everything at once (e.g. a layout file or a reset).
    pub fn replace(&mut self, options: LayoutOptions) -> bool {
        if let ChartHeight::Px(px) = options.height {
            self.pixel_height = clamp_height(px);
        }
        self.commit(LayoutChange::Replaced, options)
    }

    fn apply(&mut self, change: LayoutChange, f: impl FnOnce(&mut LayoutOptions)) -> bool {
        let mut next = self.options.clone();
        f(&mut next);
        self.commit(change, next)
    }

    /// Normalizes `next`, stores it and notifies subscribers. No-op edits publish nothing.
    fn commit(&mut self, change: LayoutChange, next: LayoutOptions) -> bool {
        let next = next.normalized(self.archetype);
        if next == self.options && change != LayoutChange::Archetype {
            return false;
        }
        self.options = next;
        self.revision += 1;
        tracing::debug!(?change, revision = self.revision, "layout changed");

        let event = LayoutEvent {
            change,
            revision: self.revision,
            archetype: self.archetype,
            options: &self.options,
        };
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&event);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn sizes_are_clamped() {
        let mut m = LayoutModel::new(ChartArchetype::Bar);
        m.set_width(50.0);
        assert_eq!(m.options().width, MIN_WIDTH);
        m.set_width(5000.0);
        assert_eq!(m.options().width, MAX_WIDTH);
        m.set_height(10.0);
        assert_eq!(m.options().height, ChartHeight::Px(MIN_HEIGHT));
        m.set_height(f64::NAN);
        assert_eq!(m.options().height, ChartHeight::Px(DEFAULT_HEIGHT));
    }

    #[test]
    fn table_height_is_always_auto_and_pixel_height_is_remembered() {
        let mut m = LayoutModel::new(ChartArchetype::Bar);
        m.set_height(600.0);
        m.set_archetype(ChartArchetype::Table);
        assert_eq!(m.options().height, ChartHeight::Auto);
        m.set_height(300.0);
        assert_eq!(m.options().height, ChartHeight::Auto);
        m.set_archetype(ChartArchetype::Radar);
        assert_eq!(m.options().height, ChartHeight::Px(300.0));
    }

    #[test]
    fn subscribers_see_each_effective_change_once() {
        let mut m = LayoutModel::new(ChartArchetype::Line);
        let seen: Rc<RefCell<Vec<(LayoutChange, f64)>>> = Rc::default();
        let sink = Rc::clone(&seen);
        let id = m.subscribe(move |e| sink.borrow_mut().push((e.change, e.options.width)));

        assert!(m.set_width(640.0));
        assert!(!m.set_width(640.0));
        assert!(m.set_show_legend(false));
        assert_eq!(
            *seen.borrow(),
            vec![(LayoutChange::Width, 640.0), (LayoutChange::Legend, 640.0)]
        );
        assert_eq!(m.revision(), 2);

        assert!(m.unsubscribe(id));
        m.set_width(700.0);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn height_serializes_as_auto_or_number() {
        let opts = LayoutOptions::for_archetype(ChartArchetype::Table);
        let v = serde_json::to_value(&opts).unwrap();
        assert_eq!(v["height"], serde_json::json!("auto"));
        let back: LayoutOptions = serde_json::from_value(v).unwrap();
        assert_eq!(back.height, ChartHeight::Auto);

        let partial: LayoutOptions = serde_json::from_str(r#"{"width": 640, "height": 300}"#).unwrap();
        assert_eq!(partial.height, ChartHeight::Px(300.0));
        assert_eq!(partial.padding, Edges::uniform(16.0));
    }
}
