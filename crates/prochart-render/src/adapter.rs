//! A mounted chart that follows a [`LayoutModel`].
//!
//! The chart is mounted once per compiled spec. Layout events re-flow (or, for style-only
//! changes, just re-serialize) the existing instance; the `ChartSpec` is never recompiled here.

use crate::model::ChartLayout;
use crate::{RenderOptions, Result, layout_chart, svg};
use prochart_core::layout::{LayoutChange, LayoutEvent, LayoutModel, LayoutOptions, SubscriptionId};
use prochart_core::{ChartArchetype, ChartSpec};
use std::cell::RefCell;
use std::rc::Rc;

/// What a layout event did to the mounted chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    /// Geometry recomputed and SVG regenerated.
    Reflowed,
    /// Geometry kept; only colors/strokes changed.
    Restyled,
    /// The change has no effect on this archetype.
    Skipped,
}

#[derive(Debug)]
pub struct LiveChart {
    spec: ChartSpec,
    render: RenderOptions,
    layout: ChartLayout,
    svg: String,
    mounts: usize,
    reflows: usize,
    restyles: usize,
}

impl LiveChart {
    pub fn mount(spec: ChartSpec, options: &LayoutOptions, render: RenderOptions) -> Result<Self> {
        let layout = layout_chart(&spec, options, &render)?;
        let svg = svg::render_layout_svg(&layout, &render);
        tracing::debug!(archetype = %spec.archetype, "chart mounted");
        Ok(Self {
            spec,
            render,
            layout,
            svg,
            mounts: 1,
            reflows: 0,
            restyles: 0,
        })
    }

    pub fn spec(&self) -> &ChartSpec {
        &self.spec
    }

    pub fn layout(&self) -> &ChartLayout {
        &self.layout
    }

    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// How many times a chart instance was created; stays `1` for the lifetime of the mount.
    pub fn mount_count(&self) -> usize {
        self.mounts
    }

    pub fn reflow_count(&self) -> usize {
        self.reflows
    }

    pub fn restyle_count(&self) -> usize {
        self.restyles
    }

    pub fn apply_layout(&mut self, change: LayoutChange, options: &LayoutOptions) -> Result<Update> {
        let table = self.spec.archetype == ChartArchetype::Table;
        if table && change == LayoutChange::Height {
            return Ok(Update::Skipped);
        }

        if change.affects_geometry() {
            self.layout = layout_chart(&self.spec, options, &self.render)?;
            self.reflows += 1;
            self.svg = svg::render_layout_svg(&self.layout, &self.render);
            tracing::debug!(?change, reflows = self.reflows, "chart re-flowed");
            Ok(Update::Reflowed)
        } else {
            self.layout.options.background = options.background.clone();
            self.layout.options.border = options.border.clone();
            self.restyles += 1;
            self.svg = svg::render_layout_svg(&self.layout, &self.render);
            Ok(Update::Restyled)
        }
    }

    /// Swaps in a recompiled spec (data changed) and re-flows with the current options.
    pub fn replace_spec(&mut self, spec: ChartSpec) -> Result<()> {
        let options = self.layout.options.clone();
        self.layout = layout_chart(&spec, &options, &self.render)?;
        self.spec = spec;
        self.reflows += 1;
        self.svg = svg::render_layout_svg(&self.layout, &self.render);
        Ok(())
    }
}

/// Subscribes `chart` to `model`. Render failures are logged; the previous SVG stays in place.
pub fn attach(model: &mut LayoutModel, chart: Rc<RefCell<LiveChart>>) -> SubscriptionId {
    model.subscribe(move |event: &LayoutEvent<'_>| {
        let mut chart = chart.borrow_mut();
        if let Err(err) = chart.apply_layout(event.change, event.options) {
            tracing::warn!(%err, revision = event.revision, "failed to apply layout change");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use prochart_core::compile::{ChartBody, TableBody};
    use prochart_core::{Theme, compile::CartesianBody, compile::Series, compile::SeriesKind};

    fn bar_spec() -> ChartSpec {
        ChartSpec {
            title: "t".to_string(),
            archetype: ChartArchetype::Bar,
            theme: Theme::Default,
            legend: vec!["s".to_string()],
            body: ChartBody::Cartesian(CartesianBody {
                series_kind: SeriesKind::Bar,
                categories: vec!["a".to_string(), "b".to_string()],
                label_rotation: 0.0,
                series: vec![Series {
                    name: "s".to_string(),
                    values: vec![1.0, 2.0],
                    color: "#5470c6".to_string(),
                }],
            }),
        }
    }

    #[test]
    fn style_only_changes_keep_geometry() {
        let mut chart = LiveChart::mount(bar_spec(), &LayoutOptions::default(), RenderOptions::default()).unwrap();
        let before = chart.layout().body.clone();
        let mut options = LayoutOptions::default();
        options.background = Some("#fafafa".to_string());
        assert_eq!(chart.apply_layout(LayoutChange::Background, &options).unwrap(), Update::Restyled);
        assert_eq!(chart.layout().body, before);
        assert!(chart.svg().contains("#fafafa"));
        assert_eq!(chart.reflow_count(), 0);
    }

    #[test]
    fn table_ignores_height_changes() {
        let spec = ChartSpec {
            title: String::new(),
            archetype: ChartArchetype::Table,
            theme: Theme::Default,
            legend: Vec::new(),
            body: ChartBody::Table(TableBody {
                columns: Vec::new(),
                rows: Vec::new(),
            }),
        };
        let options = LayoutOptions::for_archetype(ChartArchetype::Table);
        let mut chart = LiveChart::mount(spec, &options, RenderOptions::default()).unwrap();
        assert_eq!(chart.apply_layout(LayoutChange::Height, &options).unwrap(), Update::Skipped);
        assert_eq!(chart.apply_layout(LayoutChange::Table, &options).unwrap(), Update::Reflowed);
    }
}
