//! Retained candle marks, one hecs entity per date.
//!
//! Entities carry the target candle plus their horizontal band; optional
//! [`Reveal`] and [`Fade`] components hold enter and exit transitions. A mark
//! keeps its key while fading so a date that comes back is revived rather
//! than duplicated.

use super::transition::Transition;
use crate::domain::market_data::Candle;
use chrono::NaiveDate;
use hecs::{Entity, World};
use std::collections::BTreeMap;

/// Data the mark is drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandleMark {
    pub candle: Candle,
}

/// Horizontal placement, plot-local pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub x: f64,
    pub width: f64,
}

/// Grow from the open price to full extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reveal(pub Transition);

/// Fade to transparent, then despawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade(pub Transition);

/// Interpolated geometry of one mark at a given instant, in price units vertically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkFrame {
    pub date: NaiveDate,
    pub x: f64,
    pub width: f64,
    pub high: f64,
    pub low: f64,
    pub body_top: f64,
    pub body_bottom: f64,
    pub bearish: bool,
    pub opacity: f64,
}

impl MarkFrame {
    fn at(mark: &CandleMark, band: &Band, reveal: Option<&Reveal>, fade: Option<&Fade>, now_ms: f64) -> Self {
        let candle = &mark.candle;
        let grow = reveal.map_or(1.0, |r| r.0.eased(now_ms));
        let from_open = |price: f64| candle.open + (price - candle.open) * grow;

        Self {
            date: candle.date,
            x: band.x,
            width: band.width,
            high: from_open(candle.high),
            low: from_open(candle.low),
            body_top: from_open(candle.body_top()),
            body_bottom: from_open(candle.body_bottom()),
            bearish: candle.is_bearish(),
            opacity: fade.map_or(1.0, |f| 1.0 - f.0.eased(now_ms)),
        }
    }
}

#[derive(Default)]
pub struct Scene {
    world: World,
    index: BTreeMap<NaiveDate, Entity>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks currently in the scene, fading ones included.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Keys of marks that are not on their way out, oldest first.
    pub fn live_keys(&self) -> Vec<NaiveDate> {
        self.index
            .iter()
            .filter(|(_, entity)| !self.is_fading(**entity))
            .map(|(date, _)| *date)
            .collect()
    }

    pub fn is_fading_key(&self, date: &NaiveDate) -> bool {
        self.index.get(date).is_some_and(|entity| self.is_fading(*entity))
    }

    fn is_fading(&self, entity: Entity) -> bool {
        self.world.get::<&Fade>(entity).is_ok()
    }

    /// Add a mark for a brand-new key, or revive a fading one in place.
    pub fn enter(&mut self, candle: Candle, band: Band, reveal: Option<Transition>) {
        if self.index.contains_key(&candle.date) {
            self.update(candle, band);
            return;
        }

        let mark = CandleMark { candle };
        let entity = match reveal {
            Some(transition) => self.world.spawn((mark, band, Reveal(transition))),
            None => self.world.spawn((mark, band)),
        };
        self.index.insert(candle.date, entity);
    }

    /// Move an existing mark to new data and placement. Unknown keys are ignored.
    pub fn update(&mut self, candle: Candle, band: Band) {
        let Some(&entity) = self.index.get(&candle.date) else {
            return;
        };
        if let Ok(mut mark) = self.world.get::<&mut CandleMark>(entity) {
            mark.candle = candle;
        }
        if let Ok(mut placement) = self.world.get::<&mut Band>(entity) {
            *placement = band;
        }
        let _ = self.world.remove_one::<Fade>(entity);
    }

    /// Start fading a mark out at `x`. A mark already fading keeps its original timing.
    pub fn exit(&mut self, date: &NaiveDate, x: f64, fade: Transition) {
        let Some(&entity) = self.index.get(date) else {
            return;
        };
        if let Ok(mut placement) = self.world.get::<&mut Band>(entity) {
            placement.x = x;
        }
        if !self.is_fading(entity) {
            let _ = self.world.insert_one(entity, Fade(fade));
        }
    }

    /// Despawn marks whose fade is over and drop finished reveals.
    pub fn prune(&mut self, now_ms: f64) {
        let faded: Vec<(Entity, NaiveDate)> = self
            .world
            .query::<(&CandleMark, &Fade)>()
            .iter()
            .filter(|(_, (_, fade))| fade.0.is_finished(now_ms))
            .map(|(entity, (mark, _))| (entity, mark.candle.date))
            .collect();
        for (entity, date) in faded {
            let _ = self.world.despawn(entity);
            self.index.remove(&date);
        }

        let revealed: Vec<Entity> = self
            .world
            .query::<&Reveal>()
            .iter()
            .filter(|(_, reveal)| reveal.0.is_finished(now_ms))
            .map(|(entity, _)| entity)
            .collect();
        for entity in revealed {
            let _ = self.world.remove_one::<Reveal>(entity);
        }
    }

    /// No mark is still growing or fading at `now_ms`.
    pub fn is_settled(&self, now_ms: f64) -> bool {
        let revealing = self.world.query::<&Reveal>().iter().any(|(_, r)| !r.0.is_finished(now_ms));
        let fading = self.world.query::<&Fade>().iter().any(|(_, f)| !f.0.is_finished(now_ms));
        !revealing && !fading
    }

    /// Every mark's geometry at `now_ms`, oldest date first.
    pub fn frames(&self, now_ms: f64) -> Vec<MarkFrame> {
        let mut frames: Vec<MarkFrame> = self
            .world
            .query::<(&CandleMark, &Band, Option<&Reveal>, Option<&Fade>)>()
            .iter()
            .map(|(_, (mark, band, reveal, fade))| MarkFrame::at(mark, band, reveal, fade, now_ms))
            .collect();
        frames.sort_by_key(|frame| frame.date);
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(day: u32, open: f64, close: f64) -> Candle {
        let date = NaiveDate::from_ymd_opt(2024, 2, day).unwrap();
        Candle::new(date, open, open.max(close) + 2.0, open.min(close) - 2.0, close)
    }

    fn band(x: f64) -> Band {
        Band { x, width: 7.0 }
    }

    #[test]
    fn reveal_grows_from_the_open_price() {
        let mut scene = Scene::new();
        scene.enter(candle(1, 100.0, 110.0), band(0.0), Some(Transition::new(0.0, 400.0)));

        let start = scene.frames(0.0)[0];
        assert_eq!((start.high, start.low, start.body_top, start.body_bottom), (100.0, 100.0, 100.0, 100.0));

        let done = scene.frames(400.0)[0];
        assert_eq!((done.high, done.low, done.body_top, done.body_bottom), (112.0, 98.0, 110.0, 100.0));
        assert!(!scene.is_settled(200.0));
        assert!(scene.is_settled(400.0));
    }

    #[test]
    fn faded_marks_are_removed_after_prune() {
        let mut scene = Scene::new();
        scene.enter(candle(1, 100.0, 90.0), band(0.0), None);
        scene.enter(candle(2, 90.0, 95.0), band(10.0), None);
        let day_one = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

        scene.exit(&day_one, -10.0, Transition::new(0.0, 300.0));
        assert_eq!(scene.live_keys().len(), 1);
        assert_eq!(scene.len(), 2);
        assert!((scene.frames(150.0)[0].opacity - 0.5).abs() < 1e-9);

        scene.prune(300.0);
        assert_eq!(scene.len(), 1);
        assert!(!scene.is_fading_key(&day_one));
    }

    #[test]
    fn re_entering_a_fading_key_revives_it() {
        let mut scene = Scene::new();
        scene.enter(candle(1, 100.0, 90.0), band(0.0), None);
        let day_one = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        scene.exit(&day_one, 0.0, Transition::new(0.0, 300.0));

        scene.enter(candle(1, 50.0, 60.0), band(5.0), None);
        assert_eq!(scene.len(), 1);
        assert!(!scene.is_fading_key(&day_one));
        let frame = scene.frames(100.0)[0];
        assert_eq!(frame.opacity, 1.0);
        assert_eq!(frame.x, 5.0);
        assert!(!frame.bearish);
    }
}
