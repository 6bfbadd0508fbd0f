use burn::backend::NdArray;
use burn::data::dataloader::batcher::Batcher;
use burn::tensor::ElementConversion;

use cifarnet_data::{CifarBatcher, CifarItem};
use cifarnet_testutils::images::make_dataset;

type TestBackend = NdArray<f32>;

#[test]
fn test_batch_shapes_and_targets() {
    let device = Default::default();
    let batcher = CifarBatcher::<TestBackend>::new(device);
    let items: Vec<CifarItem> = make_dataset(5, 9).images;

    let batch = batcher.batch(items);
    assert_eq!(batch.images.dims(), [5, 3, 32, 32]);
    assert_eq!(batch.targets.dims(), [5]);

    let targets = batch.targets.into_data().convert::<i64>().to_vec::<i64>().unwrap();
    assert_eq!(targets, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_batch_values_are_normalized() {
    let device = Default::default();
    let batcher = CifarBatcher::<TestBackend>::new(device);
    let batch = batcher.batch(make_dataset(10, 4).images);

    let min = batch.images.clone().min().into_scalar().elem::<f32>();
    let max = batch.images.max().into_scalar().elem::<f32>();
    assert!(min >= -1.0);
    assert!(max <= 1.0);
}

#[test]
fn test_channels_are_separated() {
    let mut image = vec![0u8; 32 * 32 * 3];
    for pixel in image.chunks_exact_mut(3) {
        pixel[0] = 255;
    }
    let item = CifarItem::new(image, 0).unwrap();
    let batcher = CifarBatcher::<TestBackend>::new(Default::default());
    let batch = batcher.batch(vec![item]);

    let values = batch.images.into_data().to_vec::<f32>().unwrap();
    let plane = 32 * 32;
    assert!(values[..plane].iter().all(|v| (*v - 1.0).abs() < 1e-6));
    assert!(values[plane..].iter().all(|v| (*v + 1.0).abs() < 1e-6));
}
