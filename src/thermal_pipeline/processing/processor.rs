use tracing::{debug, instrument};

use crate::thermal_pipeline::{
    calibration::{CalibrationModel, TemperatureReadings},
    common::error::ProcessingError,
    frame::{
        Annotation, AnnotationKind, AnnotationRole, DisplayFrame, LayerStyle, MarkerPositions,
        PixelPos, RawFrame,
    },
    processing::{
        colormap,
        config::ProcessingConfig,
        grayscale, overlay,
        timing::{ProcessingStage, ProcessingTimings},
    },
};

/// Turns raw sensor frames into annotated display frames.
pub struct FrameProcessor {
    model: CalibrationModel,
    config: ProcessingConfig,
}

/// Readout text for a Celsius value, five characters wide with one decimal.
pub fn format_temperature(celsius: f64) -> String {
    format!("{:5.1}", celsius)
}

impl FrameProcessor {
    pub fn new(model: CalibrationModel, config: ProcessingConfig) -> Self {
        Self { model, config }
    }

    fn validate(&self, frame: &RawFrame) -> Result<(), ProcessingError> {
        frame.validate()?;
        self.config.validate()
    }

    #[instrument(skip(self, frame), fields(width = frame.width, height = frame.height))]
    pub fn process(&self, frame: &RawFrame) -> Result<DisplayFrame, ProcessingError> {
        let (display, timings) = self.process_with_timings(frame)?;
        timings.log_summary();
        Ok(display)
    }

    pub fn process_with_timings(
        &self,
        frame: &RawFrame,
    ) -> Result<(DisplayFrame, ProcessingTimings), ProcessingError> {
        let mut timings = ProcessingTimings::new();
        self.validate(frame)?;
        let scale = self.config.scale;

        let (stats, readings) = timings.time(ProcessingStage::Calibrate, || {
            let stats = grayscale::raw_stats(frame);
            let readings =
                self.model
                    .readings(stats.min, stats.max, stats.center, frame.device_sensor_value);
            (stats, readings)
        });

        let gray = timings.time(ProcessingStage::Stretch, || {
            grayscale::stretch_to_gray8(frame, &stats)
        })?;

        // Extrema are located after rotation so markers follow what the viewer sees.
        let (gray, markers) = timings.time(ProcessingStage::Rotate, || {
            let gray = grayscale::rotate(gray, self.config.rotation);
            let (min_pos, max_pos) = grayscale::locate_extrema(&gray);
            let markers = MarkerPositions {
                min: min_pos.scaled(scale),
                max: max_pos.scaled(scale),
                center: grayscale::center_of(&gray).scaled(scale),
            };
            (gray, markers)
        });

        let gray = timings.time(ProcessingStage::Resize, || grayscale::resize(gray, scale));
        let gray = timings.time(ProcessingStage::Legend, || grayscale::append_legend(&gray));
        let mut image = timings.time(ProcessingStage::Colorize, || {
            colormap::colorize(&gray, self.config.colormap)
        });

        let annotations = timings.time(ProcessingStage::Annotate, || {
            let annotations = self.annotations(image.width(), image.height(), &readings, &markers);
            for annotation in &annotations {
                overlay::render_annotation(&mut image, annotation, &self.config.layout);
            }
            annotations
        });

        debug!(
            min = readings.min,
            max = readings.max,
            center = readings.center,
            device_kelvin = readings.device_kelvin,
            "Frame processed"
        );

        Ok((
            DisplayFrame {
                image,
                readings,
                markers,
                annotations,
            },
            timings,
        ))
    }

    fn annotations(
        &self,
        width: u32,
        height: u32,
        readings: &TemperatureReadings,
        markers: &MarkerPositions,
    ) -> Vec<Annotation> {
        let layout = &self.config.layout;
        let (width, height) = (width as i32, height as i32);
        let reading = |role, position, celsius, style| Annotation {
            role,
            position,
            kind: AnnotationKind::Text(format_temperature(celsius)),
            style,
        };
        let marker = |role, position, style| Annotation {
            role,
            position,
            kind: AnnotationKind::Crosshair,
            style,
        };

        let min_anchor = PixelPos::new(
            width - layout.min_anchor_inset.x,
            height - layout.min_anchor_inset.y,
        );
        let max_anchor = PixelPos::new(width - layout.max_anchor_inset.x, layout.max_anchor_inset.y);

        let mut annotations = vec![
            reading(AnnotationRole::MinReading, min_anchor, readings.min, LayerStyle::COLD),
            reading(AnnotationRole::MaxReading, max_anchor, readings.max, LayerStyle::HOT),
            reading(
                AnnotationRole::CenterReading,
                markers.center,
                readings.center,
                LayerStyle::NEUTRAL,
            ),
            marker(AnnotationRole::CenterMarker, markers.center, LayerStyle::NEUTRAL),
            marker(AnnotationRole::MinMarker, markers.min, LayerStyle::COLD),
            marker(AnnotationRole::MaxMarker, markers.max, LayerStyle::HOT),
        ];

        if readings.max > self.config.warning_threshold_celsius {
            annotations.push(Annotation {
                role: AnnotationRole::Warning,
                position: markers.max,
                kind: AnnotationKind::Text(self.config.warning_text.clone()),
                style: LayerStyle::HOT,
            });
        }
        annotations
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }
}
