use crate::easing::{ease_out_cubic, keyframe_value, lerp};
use crate::variables::Variable;
use fnv::FnvHashMap;
use smallvec::SmallVec;

pub type Keyframes = SmallVec<[f32; 8]>;

#[derive(Clone, Debug, PartialEq)]
pub enum AnimationTarget {
    Scalar(f32),
    Keyframes(Keyframes),
}

impl From<f32> for AnimationTarget {
    fn from(v: f32) -> Self {
        Self::Scalar(v)
    }
}

impl From<&[f32]> for AnimationTarget {
    fn from(frames: &[f32]) -> Self {
        Self::Keyframes(Keyframes::from_slice(frames))
    }
}

/// One running variable animation. Scalar targets ease out (cubic) from the
/// start value; keyframe targets run linearly through start, then each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableAnimation {
    frames: Keyframes,
    eased: bool,
    elapsed_ms: f64,
    duration_ms: f64,
}

impl VariableAnimation {
    pub fn new(start: f32, target: AnimationTarget, duration_ms: f64) -> Self {
        let (frames, eased) = match target {
            AnimationTarget::Scalar(to) => (Keyframes::from_slice(&[start, to]), true),
            AnimationTarget::Keyframes(ks) => {
                let mut frames = Keyframes::with_capacity(ks.len() + 1);
                frames.push(start);
                frames.extend(ks);
                (frames, false)
            }
        };
        Self {
            frames,
            eased,
            elapsed_ms: 0.0,
            duration_ms: duration_ms.max(0.0),
        }
    }

    pub fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            1.0
        } else {
            (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0) as f32
        }
    }

    pub fn value(&self) -> f32 {
        let t = self.progress();
        if self.eased {
            lerp(self.frames[0], self.frames[1], ease_out_cubic(t))
        } else {
            keyframe_value(&self.frames, t).unwrap_or(self.frames[0])
        }
    }

    pub fn is_done(&self) -> bool {
        self.progress() >= 1.0
    }

    fn advance(&mut self, dt_ms: f64) {
        self.elapsed_ms += dt_ms.max(0.0);
    }
}

/// At most one animation per variable; a new one replaces the old.
#[derive(Debug, Default)]
pub struct AnimationSet {
    running: FnvHashMap<Variable, VariableAnimation>,
}

impl AnimationSet {
    pub fn start(&mut self, var: Variable, start: f32, target: AnimationTarget, duration_ms: f64) {
        self.running
            .insert(var, VariableAnimation::new(start, target, duration_ms));
    }

    /// Current interpolated value of a running animation.
    pub fn current(&self, var: Variable) -> Option<f32> {
        self.running.get(&var).map(VariableAnimation::value)
    }

    pub fn is_running(&self, var: Variable) -> bool {
        self.running.contains_key(&var)
    }

    pub fn cancel(&mut self, var: Variable) {
        self.running.remove(&var);
    }

    /// Step every animation. Finished ones keep reporting their final value
    /// until [`AnimationSet::retire_finished`] drops them.
    pub fn advance(&mut self, dt_ms: f64) {
        for anim in self.running.values_mut() {
            anim.advance(dt_ms);
        }
    }

    /// Drop finished animations; their variables fall back to the base value.
    pub fn retire_finished(&mut self) -> usize {
        let before = self.running.len();
        self.running.retain(|_, a| !a.is_done());
        before - self.running.len()
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }
}
