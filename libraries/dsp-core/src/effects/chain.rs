/// Unit that can sit in an [`EffectChain`]
///
/// # Real-Time Constraints
/// - No allocation in `process()`
/// - No blocking
/// - Must be `Send` so a chain can be built on one thread and run on the audio thread
pub trait AudioEffect: Send {
    /// Process a mono block in place
    fn process(&mut self, buffer: &mut [f32]);

    /// Clear internal history (delay lines, filter state, convolution tail)
    fn reset(&mut self);

    /// Enable/disable the effect
    fn set_enabled(&mut self, enabled: bool);

    /// Check if effect is enabled
    fn is_enabled(&self) -> bool;

    /// Short display name
    fn name(&self) -> &str;
}

/// Effects processed in insertion order
#[derive(Default)]
pub struct EffectChain {
    effects: Vec<Box<dyn AudioEffect>>,
}

impl EffectChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an effect
    pub fn add_effect(&mut self, effect: Box<dyn AudioEffect>) {
        self.effects.push(effect);
    }

    /// Run the block through every enabled effect
    pub fn process(&mut self, buffer: &mut [f32]) {
        for effect in &mut self.effects {
            if effect.is_enabled() {
                effect.process(buffer);
            }
        }
    }

    /// Reset all effects
    pub fn reset(&mut self) {
        for effect in &mut self.effects {
            effect.reset();
        }
    }

    /// Remove all effects
    pub fn clear(&mut self) {
        self.effects.clear();
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn get_effect(&self, index: usize) -> Option<&dyn AudioEffect> {
        self.effects.get(index).map(|e| e.as_ref())
    }

    pub fn get_effect_mut(&mut self, index: usize) -> Option<&mut dyn AudioEffect> {
        self.effects
            .get_mut(index)
            .map(|effect| effect.as_mut() as &mut dyn AudioEffect)
    }

    /// Names in processing order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.effects.iter().map(|e| e.name())
    }

    /// Enable/disable every effect
    pub fn set_enabled(&mut self, enabled: bool) {
        for effect in &mut self.effects {
            effect.set_enabled(enabled);
        }
    }
}

impl std::fmt::Debug for EffectChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
