//! Onset detection shared by the pedal stages

/// Indices where `is_onset` fires and a full scoring window follows.
///
/// Index 0 is never an onset since it has no predecessor. An onset at `i`
/// is only kept when sample `i + window` exists.
pub(crate) fn scored_onsets(len: usize, window: usize, is_onset: impl Fn(usize) -> bool) -> Vec<usize> {
    (1..len)
        .take_while(|&i| i.checked_add(window).is_some_and(|end| end < len))
        .filter(|&i| is_onset(i))
        .collect()
}
