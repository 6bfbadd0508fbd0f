use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbImage};

use crate::error::OutputError;
use crate::tensorboard::proto::summary::{value, Image as SummaryImage, Value as SummaryValue};
use crate::tensorboard::proto::{HistogramProto, Summary};

fn single_value(tag: &str, value: value::Value) -> Summary {
    Summary {
        value: vec![SummaryValue {
            node_name: String::new(),
            tag: tag.to_string(),
            value: Some(value),
        }],
    }
}

pub fn scalar(tag: &str, scalar_value: f32) -> Summary {
    single_value(tag, value::Value::SimpleValue(scalar_value))
}

/// Equal-width histogram over `data`. A constant input becomes one bucket.
pub fn histogram_proto(data: &[f64], num_buckets: usize) -> HistogramProto {
    let num_buckets = num_buckets.max(1);
    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let sum: f64 = data.iter().sum();
    let sum_squares: f64 = data.iter().map(|x| x * x).sum();
    let num = data.len() as f64;

    if data.is_empty() {
        return HistogramProto::default();
    }

    if (max - min).abs() < f64::EPSILON {
        return HistogramProto {
            min,
            max,
            num,
            sum,
            sum_squares,
            bucket_limit: vec![max],
            bucket: vec![num],
        };
    }

    let bucket_width = (max - min) / num_buckets as f64;
    let bucket_limit = (0..num_buckets)
        .map(|i| min + (i as f64 + 1.0) * bucket_width)
        .collect();
    // bucket i covers (limit[i-1], limit[i]]; the first one also takes `min`.
    let mut bucket = vec![0.0; num_buckets];
    for &value in data {
        let idx = ((value - min) / bucket_width).ceil() as usize;
        bucket[idx.saturating_sub(1).min(num_buckets - 1)] += 1.0;
    }

    HistogramProto {
        min,
        max,
        num,
        sum,
        sum_squares,
        bucket_limit,
        bucket,
    }
}

pub fn histogram(tag: &str, data: &[f64], num_buckets: usize) -> Summary {
    single_value(tag, value::Value::Histo(histogram_proto(data, num_buckets)))
}

/// PNG-encodes an RGB image given in CHW byte order.
pub fn image(tag: &str, data: &[u8], dims: [usize; 3]) -> Result<Summary, OutputError> {
    let [channels, height, width] = dims;
    let expected = channels * height * width;
    if channels != 3 || data.len() != expected {
        return Err(OutputError::ImageShape {
            dims,
            expected,
            found: data.len(),
        });
    }

    let plane = height * width;
    let mut hwc = Vec::with_capacity(expected);
    for pixel in 0..plane {
        for channel in 0..channels {
            hwc.push(data[channel * plane + pixel]);
        }
    }

    let rgb = RgbImage::from_raw(width as u32, height as u32, hwc).ok_or(
        OutputError::ImageShape {
            dims,
            expected,
            found: data.len(),
        },
    )?;
    let mut encoded = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(rgb).write_to(&mut encoded, ImageFormat::Png)?;

    let summary_image = SummaryImage {
        height: height as i32,
        width: width as i32,
        colorspace: channels as i32,
        encoded_image_string: encoded.into_inner(),
    };
    Ok(single_value(tag, value::Value::Image(summary_image)))
}
