use crate::domain::chart::PriceDomain;

/// Cubic ease-in-out over `[0, 1]`.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// A time window measured on the host's animation clock (milliseconds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub started_ms: f64,
    pub duration_ms: f64,
}

impl Transition {
    pub fn new(started_ms: f64, duration_ms: f64) -> Self {
        Self { started_ms, duration_ms: duration_ms.max(0.0) }
    }

    /// Linear progress; a zero-length transition is already complete.
    pub fn progress(&self, now_ms: f64) -> f64 {
        if self.duration_ms == 0.0 {
            return 1.0;
        }
        ((now_ms - self.started_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn eased(&self, now_ms: f64) -> f64 {
        ease_cubic_in_out(self.progress(now_ms))
    }

    pub fn is_finished(&self, now_ms: f64) -> bool {
        self.progress(now_ms) >= 1.0
    }
}

/// Value-axis domain easing from one range to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainTransition {
    from: PriceDomain,
    to: PriceDomain,
    timing: Transition,
}

impl DomainTransition {
    /// Already settled on `domain`.
    pub fn settled(domain: PriceDomain) -> Self {
        Self { from: domain, to: domain, timing: Transition::new(0.0, 0.0) }
    }

    pub fn target(&self) -> PriceDomain {
        self.to
    }

    pub fn domain_at(&self, now_ms: f64) -> PriceDomain {
        self.from.lerp(&self.to, self.timing.eased(now_ms))
    }

    /// Head for `to`, starting from wherever the axis is right now.
    /// Retargeting to the current target keeps the running transition.
    pub fn retarget(&mut self, to: PriceDomain, now_ms: f64, duration_ms: f64) {
        if to == self.to {
            return;
        }
        *self = Self { from: self.domain_at(now_ms), to, timing: Transition::new(now_ms, duration_ms) };
    }

    pub fn is_finished(&self, now_ms: f64) -> bool {
        self.timing.is_finished(now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_hits_endpoints_and_midpoint() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(0.5), 0.5);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert_eq!(ease_cubic_in_out(3.0), 1.0);
    }

    #[test]
    fn zero_duration_is_finished_immediately() {
        assert!(Transition::new(10.0, 0.0).is_finished(10.0));
    }

    #[test]
    fn retarget_starts_from_the_current_domain() {
        let mut axis = DomainTransition::settled(PriceDomain::new(0.0, 100.0));
        axis.retarget(PriceDomain::new(100.0, 200.0), 0.0, 300.0);
        assert_eq!(axis.domain_at(150.0), PriceDomain::new(50.0, 150.0));

        axis.retarget(PriceDomain::new(0.0, 100.0), 150.0, 300.0);
        assert_eq!(axis.domain_at(150.0), PriceDomain::new(50.0, 150.0));
        assert!(!axis.is_finished(449.0));
        assert_eq!(axis.domain_at(450.0), PriceDomain::new(0.0, 100.0));
    }
}
