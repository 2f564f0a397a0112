use std::collections::VecDeque;

use crate::common::Frame;
use crate::config::DetectionSettings;
use crate::error::DetectionError;
use crate::landmarks::types::Detections;

/// The landmark-detection engine. Opaque to this crate.
///
/// Given an image it reports zero or more hands and zero or one body pose. The source may track
/// across frames internally, but callers never rely on identities being stable between calls.
pub trait LandmarkSource: Send {
    fn name(&self) -> &'static str;

    /// Receives confidence thresholds once, before the first frame.
    fn configure(&mut self, _settings: &DetectionSettings) -> Result<(), DetectionError> {
        Ok(())
    }

    fn detect(&mut self, frame: &Frame) -> Result<Detections, DetectionError>;
}

impl LandmarkSource for Box<dyn LandmarkSource> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn configure(&mut self, settings: &DetectionSettings) -> Result<(), DetectionError> {
        (**self).configure(settings)
    }

    fn detect(&mut self, frame: &Frame) -> Result<Detections, DetectionError> {
        (**self).detect(frame)
    }
}

/// Replays a fixed script of detector results, one per call.
///
/// Once the script runs out it keeps answering with the `idle` result.
pub struct ScriptedLandmarkSource {
    script: VecDeque<Result<Detections, DetectionError>>,
    idle: Detections,
    looping: bool,
    played: Vec<Result<Detections, DetectionError>>,
}

impl ScriptedLandmarkSource {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            idle: Detections::default(),
            looping: false,
            played: Vec::new(),
        }
    }

    pub fn push(mut self, detections: Detections) -> Self {
        self.script.push_back(Ok(detections));
        self
    }

    pub fn push_repeated(mut self, detections: Detections, times: usize) -> Self {
        for _ in 0..times {
            self.script.push_back(Ok(detections.clone()));
        }
        self
    }

    pub fn push_error(mut self, error: DetectionError) -> Self {
        self.script.push_back(Err(error));
        self
    }

    /// Result returned once the script is exhausted.
    pub fn idle(mut self, detections: Detections) -> Self {
        self.idle = detections;
        self
    }

    /// Restart the script from the top when it runs out.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Default for ScriptedLandmarkSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LandmarkSource for ScriptedLandmarkSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn detect(&mut self, _frame: &Frame) -> Result<Detections, DetectionError> {
        if self.script.is_empty() && self.looping && !self.played.is_empty() {
            self.script.extend(self.played.drain(..));
        }
        match self.script.pop_front() {
            Some(result) => {
                if self.looping {
                    self.played.push(result.clone());
                }
                result
            }
            None => Ok(self.idle.clone()),
        }
    }
}
