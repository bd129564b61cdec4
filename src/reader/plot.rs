//! Materializing series for plotting and image series as raw arrays.

use crate::core::{DenseArray, ImageStream, SignalStream};
use crate::util::{Error, Result};

/// Decimated timestamps plus one value sequence per channel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlottableSeries {
    pub timestamps: Vec<f64>,
    pub channels: Vec<Vec<f64>>,
}

impl PlottableSeries {
    /// Number of kept samples.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<Vec<f64>>) {
        (self.timestamps, self.channels)
    }
}

impl From<PlottableSeries> for (Vec<f64>, Vec<Vec<f64>>) {
    fn from(series: PlottableSeries) -> Self {
        series.into_parts()
    }
}

/// Stride for keeping roughly `resampling_size` of `num_samples` samples.
///
/// Decimation only kicks in when the series is strictly longer than the
/// requested size; `None` and `Some(0)` keep everything.
pub fn decimation_step(num_samples: usize, resampling_size: Option<usize>) -> usize {
    match resampling_size {
        Some(size) if size > 0 && num_samples > size => num_samples / size,
        _ => 1,
    }
}

/// Read `series`, keep every `step`-th sample and split it into channels.
pub fn plottable(series: &SignalStream, resampling_size: Option<usize>) -> Result<PlottableSeries> {
    let data = series.data().read()?;
    let num_samples = data.shape().num_samples();
    let step = decimation_step(num_samples, resampling_size);

    let timestamps = series.time_axis().decimated(num_samples, step)?;
    let channels = data.decimated_channels(step);
    check_lengths(&timestamps, &channels)?;

    tracing::debug!(
        samples = num_samples,
        step,
        kept = timestamps.len(),
        channels = channels.len(),
        "materialized series"
    );
    Ok(PlottableSeries { timestamps, channels })
}

fn check_lengths(timestamps: &[f64], channels: &[Vec<f64>]) -> Result<()> {
    match channels.iter().find(|c| c.len() != timestamps.len()) {
        Some(channel) => Err(Error::LengthMismatch {
            values: channel.len(),
            timestamps: timestamps.len(),
        }),
        None => Ok(()),
    }
}

/// Full frame array of an image series, shape preserved.
pub fn raw_array(image: &ImageStream) -> Result<DenseArray> {
    let array = image.series().data().read()?;
    tracing::debug!(
        shape = %array.shape(),
        dtype = %array.element_type(),
        format = image.format().unwrap_or("raw"),
        external_file = image.external_file(),
        "read image frames"
    );
    Ok(array)
}

/// Channel count as reported for UI listings.
///
/// One-dimensional data reports 1; anything else reports its leading
/// dimension (the sample count). Scalars count as a single sample.
pub fn channel_count(series: &SignalStream) -> usize {
    let shape = series.data().shape();
    if shape.rank() == 1 {
        1
    } else {
        shape.num_samples()
    }
}
