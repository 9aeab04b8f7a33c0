//! Common capability trait for controllable assets.

/// A controllable asset driven by one normalized action per hour.
///
/// Generators and the battery share this interface so the plant can apply
/// an action vector uniformly, while keeping their own sign conventions:
/// a generator's output is never negative, whereas the battery's flow is
/// signed.
pub trait DispatchableAsset {
    /// Applies a normalized action (nominally in `[-1, 1]`) for one hour.
    fn apply_action(&mut self, action: f32);

    /// Returns the asset's contribution to supply for the last hour.
    ///
    /// Positive values add to supply (generation, battery discharge),
    /// negative values subtract from it (battery charging).
    fn supply(&self) -> f32;

    /// Returns the operating cost of the asset's current state.
    fn operating_cost(&self) -> f32;

    /// Returns a human-readable type name for the asset.
    fn asset_type(&self) -> &'static str;
}
