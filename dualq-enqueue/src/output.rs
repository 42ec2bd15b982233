use std::{fmt, sync::Arc};

/// A downstream path packets can be pushed to.
pub trait Output<P>: Send + Sync {
    fn push(&self, packet: P);
}

impl<P, F> Output<P> for F
where
    F: Fn(P) + Send + Sync,
{
    #[inline]
    fn push(&self, packet: P) {
        self(packet)
    }
}

/// What happens to packets that are refused admission.
pub enum Overflow<P> {
    /// The packet is dropped.
    Destroy,
    /// The packet is forwarded untouched to an overflow path.
    DivertTo(Arc<dyn Output<P>>),
}

impl<P> Overflow<P> {
    /// Selects the overflow behaviour from the outputs available beyond the two class outputs.
    /// Only the first extra output is ever used.
    pub fn from_extra(mut extra: Vec<Arc<dyn Output<P>>>) -> Self {
        if extra.len() > 1 {
            tracing::warn!(unused = extra.len() - 1, "only the first overflow output is used");
        }

        if extra.is_empty() {
            Self::Destroy
        } else {
            Self::DivertTo(extra.swap_remove(0))
        }
    }

    #[inline]
    pub(crate) fn handle(&self, packet: P) {
        match self {
            Self::Destroy => drop(packet),
            Self::DivertTo(output) => output.push(packet),
        }
    }
}

impl<P> fmt::Debug for Overflow<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Destroy => f.write_str("Destroy"),
            Self::DivertTo(_) => f.write_str("DivertTo(..)"),
        }
    }
}

/// The forwarding paths of an enqueue controller.
pub struct Outputs<P> {
    pub(crate) classical: Arc<dyn Output<P>>,
    pub(crate) scalable: Arc<dyn Output<P>>,
    pub(crate) overflow: Overflow<P>,
    count: usize,
}

impl<P> Outputs<P> {
    /// Creates the two mandatory class outputs. Refused packets are destroyed.
    pub fn new(classical: Arc<dyn Output<P>>, scalable: Arc<dyn Output<P>>) -> Self {
        Self { classical, scalable, overflow: Overflow::Destroy, count: 2 }
    }

    /// Adds the optional outputs that follow the two class outputs.
    pub fn with_extra(mut self, extra: Vec<Arc<dyn Output<P>>>) -> Self {
        self.count = 2 + extra.len();
        self.overflow = Overflow::from_extra(extra);
        self
    }

    /// Returns the total number of outputs.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn overflow(&self) -> &Overflow<P> {
        &self.overflow
    }
}

impl<P> fmt::Debug for Outputs<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outputs")
            .field("count", &self.count)
            .field("overflow", &self.overflow)
            .finish_non_exhaustive()
    }
}
