/// Side effect requested from the renderer/animator.
///
/// The controller only emits these; applying them (easing, playback,
/// placing a new tree) is up to the caller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Move the tree's uniform scale to this value.
    UpdateScale(f64),
    StartAnimation,
    StopAnimation,
    /// A fully grown tree spawns a neighbour.
    SpawnInstance,
}
