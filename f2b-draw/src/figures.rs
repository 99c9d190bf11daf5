use f2b_geom::FigureId;
use log::debug;

/// Which figures are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FigureSet {
    enabled: [bool; FigureId::ALL.len()],
}

impl FigureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self, id: FigureId) -> bool {
        self.enabled[id.index()]
    }

    pub fn toggle(&mut self, id: FigureId, enabled: bool) {
        debug!("figure {} {}", id, if enabled { "on" } else { "off" });
        self.enabled[id.index()] = enabled;
    }

    /// The enabled figures in pattern order.
    pub fn enabled(&self) -> impl Iterator<Item = FigureId> + '_ {
        FigureId::ALL.iter().copied().filter(move |&id| self.is_enabled(id))
    }

    /// Moves on to the next figure of the pattern.
    ///
    /// With nothing enabled the first figure is enabled. With exactly one figure
    /// enabled, it is swapped for the one after it. Anything else is left alone,
    /// including the last figure.
    pub fn advance(&mut self) -> Option<FigureId> {
        let enabled: Vec<FigureId> = self.enabled().collect();
        match enabled.as_slice() {
            [] => {
                let first = FigureId::ALL[0];
                self.toggle(first, true);
                Some(first)
            }
            [current] => {
                let next = FigureId::ALL.get(current.index() + 1).copied()?;
                self.toggle(*current, false);
                self.toggle(next, true);
                Some(next)
            }
            _ => None,
        }
    }
}
