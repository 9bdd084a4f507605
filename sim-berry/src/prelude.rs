//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d, PointXy};

pub use crate::{
    open_stack, save_stack, BerryError, ImageStack, ImgWriteRaw, ImgWriteVis, Mask2d, SampleType,
    StackAttr, VoxelSize,
};

pub use crate::consts::gray::{MASK_INSIDE, MASK_OUTSIDE};
pub use crate::consts::DEFAULT_PERCENTILE;

pub use crate::condensate::{
    detect, detect_batch, percentile_threshold, BatchMode, BatchOutcome, Connectivity, Detector,
    FeatureRow, FeatureTable,
};
pub use crate::expression::{expression_levels, mean_masked_intensity};
pub use crate::propagate::{apply_mask, broadcast_mask, resample_mask};
pub use crate::reduce::{max_projection, normalize_for_display, to_grayscale};
pub use crate::roi::{
    Choice, ChoicePrompt, LinePrompt, PlaneDisplay, PngPreview, Polygon, PolygonCapture,
    RecordedPolygons, VertexRecord,
};
pub use crate::spectrum::fft_magnitude;

pub use crate::dataset::home_dataset_dir_with;
pub use crate::dataset::{self, discover_groups, group_loader, RoiGroup};

pub use crate::workflow::{mask_cell, spectrum_check};
