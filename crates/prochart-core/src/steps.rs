use serde::{Deserialize, Serialize};
use std::cell::{Cell, OnceCell};
use std::fmt;

/// Wizard steps in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WizardStep {
    SelectProducts,
    SelectParameters,
    ChooseArchetypeAndStyle,
    TuneLayout,
    PreviewExport,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::SelectProducts,
        WizardStep::SelectParameters,
        WizardStep::ChooseArchetypeAndStyle,
        WizardStep::TuneLayout,
        WizardStep::PreviewExport,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::SelectProducts => "选择产品",
            WizardStep::SelectParameters => "选择参数",
            WizardStep::ChooseArchetypeAndStyle => "图表类型与风格",
            WizardStep::TuneLayout => "布局调整",
            WizardStep::PreviewExport => "预览与导出",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

type ViewFactory<V> = Box<dyn Fn(WizardStep) -> V>;

/// Maps each wizard step to the factory of its view, resolved lazily and at most once.
///
/// Resolving the same step twice returns the cached view; independent steps can be resolved in
/// any order.
pub struct StepRegistry<V> {
    factories: [Option<ViewFactory<V>>; 5],
    views: [OnceCell<V>; 5],
    loads: [Cell<usize>; 5],
}

impl<V> Default for StepRegistry<V> {
    fn default() -> Self {
        Self {
            factories: Default::default(),
            views: Default::default(),
            loads: Default::default(),
        }
    }
}

impl<V> StepRegistry<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the factory for `step`. A view that was already resolved is kept.
    pub fn register(&mut self, step: WizardStep, factory: impl Fn(WizardStep) -> V + 'static) {
        self.factories[step.index()] = Some(Box::new(factory));
    }

    /// Registers one factory for every step.
    pub fn with_all(factory: impl Fn(WizardStep) -> V + Clone + 'static) -> Self {
        let mut registry = Self::new();
        for step in WizardStep::ALL {
            registry.register(step, factory.clone());
        }
        registry
    }

    pub fn is_registered(&self, step: WizardStep) -> bool {
        self.factories[step.index()].is_some()
    }

    pub fn is_loaded(&self, step: WizardStep) -> bool {
        self.views[step.index()].get().is_some()
    }

    /// Resolves the view of `step`, creating it on first use.
    pub fn view(&self, step: WizardStep) -> Option<&V> {
        let i = step.index();
        let factory = self.factories[i].as_ref()?;
        Some(self.views[i].get_or_init(|| {
            self.loads[i].set(self.loads[i].get() + 1);
            tracing::debug!(%step, "loading step view");
            factory(step)
        }))
    }

    /// How many times the factory of `step` ran.
    pub fn load_count(&self, step: WizardStep) -> usize {
        self.loads[step.index()].get()
    }
}
