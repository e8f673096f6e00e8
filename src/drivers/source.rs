use crate::drivers::SampleBundle;

/// Something that can yield one sample bundle per tick.
pub trait SampleSource: Send {
    fn num_channels(&self) -> usize;
    /// `None` means the source has run dry and the ticker should stop.
    fn next_bundle(&mut self) -> Option<SampleBundle>;
}
#[cfg(test)]
pub use replay::ReplaySource;
