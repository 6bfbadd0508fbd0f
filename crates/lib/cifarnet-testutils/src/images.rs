use cifarnet_data::cifar::{HEIGHT, IMAGE_BYTES, WIDTH};
use cifarnet_data::{CifarDataset, CifarItem};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// An HWC image whose color depends on the label, with a little noise on top.
pub fn class_image(label: u8, rng: &mut StdRng) -> Vec<u8> {
    let base = [
        (label as u16 * 25) as u8,
        255 - (label as u16 * 20) as u8,
        ((label as u16 * 70) % 256) as u8,
    ];
    (0..WIDTH * HEIGHT)
        .flat_map(|_| base)
        .map(|value| value.saturating_add(rng.gen_range(0..8)))
        .collect()
}

/// `count` items cycling through all ten labels.
pub fn make_dataset(count: usize, seed: u64) -> CifarDataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let images = (0..count)
        .map(|idx| {
            let label = (idx % 10) as u8;
            CifarItem::new(class_image(label, &mut rng), label).expect("valid synthetic item")
        })
        .collect();
    CifarDataset::with_images(images)
}

/// Encodes items in the binary batch layout: a label byte followed by CHW planes.
pub fn binary_records(items: &[CifarItem]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(items.len() * (IMAGE_BYTES + 1));
    for item in items {
        bytes.push(item.label());
        bytes.extend(item.to_chw());
    }
    bytes
}
