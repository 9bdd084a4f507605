//! 堆栈文件的读写.
//!
//! - `.npy`: 直接按 numpy 的元素类型读写.
//! - 其他扩展名 (一般为 `.tif` / `.tiff`): 多页灰度 TIFF, 一页对应一层 z 切片.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ndarray::{Array3, ArrayD, Axis, Ix3};
use ndarray_npy::{read_npy, write_npy, ReadNpyError};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::ColorType;

use super::sample::{narrow, widen};
use super::{ImageStack, SampleType, StackAttr};
use crate::{BerryError, Result};

/// 路径是否以 `.npy` 结尾 (大小写不敏感).
#[inline]
fn is_npy(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("npy"))
}

/// 打开堆栈文件. 2 维数据被视为只有一层的堆栈.
///
/// # 错误
///
/// - 文件维数不是 2 或 3 时返回 [`BerryError::InvalidShape`];
/// - 元素类型不受支持时返回 [`BerryError::UnsupportedSampleType`];
/// - 其他底层错误原样返回.
pub fn open_stack<P: AsRef<Path>>(path: P) -> Result<ImageStack> {
    let path = path.as_ref();
    let stack = if is_npy(path) {
        read_npy_stack(path)?
    } else {
        read_tiff_stack(path)?
    };
    log::debug!(
        "Loaded {} as {:?} {}",
        path.display(),
        stack.shape(),
        stack.sample_type()
    );
    Ok(stack)
}

/// 按 `stack` 的原始元素类型保存到 `path`.
pub fn save_stack<P: AsRef<Path>>(path: P, stack: &ImageStack) -> Result<()> {
    let path = path.as_ref();
    if is_npy(path) {
        write_npy_stack(path, stack)
    } else {
        write_tiff_stack(path, stack)
    }
}

/// 将任意维数据整理成 `(z, H, W)`.
fn into_stack(data: ArrayD<f64>, sample_type: SampleType) -> Result<ImageStack> {
    let data = match data.ndim() {
        2 => data.insert_axis(Axis(0)),
        3 => data,
        ndim => return Err(BerryError::InvalidShape { ndim }),
    };
    // 维数已检查, 该转换不会失败.
    let data = data
        .into_dimensionality::<Ix3>()
        .map_err(|_| BerryError::InvalidShape { ndim: 3 })?;
    Ok(ImageStack::new(data, sample_type))
}

fn read_npy_stack(path: &Path) -> Result<ImageStack> {
    // npy 头中的类型描述与请求类型不符时返回 `WrongDescriptor`, 依次尝试即可.
    macro_rules! try_read {
        ($($t: ty => $sample: expr),+ $(,)?) => {
            $(
                match read_npy::<_, ArrayD<$t>>(path) {
                    Ok(arr) => return into_stack(arr.mapv(|v| v as f64), $sample),
                    Err(ReadNpyError::WrongDescriptor(_)) => {}
                    Err(e) => return Err(e.into()),
                }
            )+
        };
    }

    try_read!(
        u16 => SampleType::U16,
        u8 => SampleType::U8,
        f32 => SampleType::F32,
        f64 => SampleType::F64,
        i16 => SampleType::I16,
        u32 => SampleType::U32,
        i32 => SampleType::I32,
        i8 => SampleType::I8,
    );
    Err(BerryError::UnsupportedSampleType(format!(
        "{} 的 npy 元素类型",
        path.display()
    )))
}

fn write_npy_stack(path: &Path, stack: &ImageStack) -> Result<()> {
    macro_rules! write_as {
        ($t: ty) => {{
            let data: Array3<$t> = Array3::from_shape_vec(
                stack.shape(),
                narrow::<$t, _>(stack.data().iter()),
            )
            .unwrap(); // 形状取自堆栈本身, 不会生成 `Err`.
            write_npy(path, &data)?
        }};
    }

    match stack.sample_type() {
        SampleType::U8 => write_as!(u8),
        SampleType::U16 => write_as!(u16),
        SampleType::U32 => write_as!(u32),
        SampleType::I8 => write_as!(i8),
        SampleType::I16 => write_as!(i16),
        SampleType::I32 => write_as!(i32),
        SampleType::F32 => write_as!(f32),
        SampleType::F64 => write_as!(f64),
    }
    Ok(())
}

/// 解码单页灰度数据.
fn decode_page(page: DecodingResult) -> Result<(SampleType, Vec<f64>)> {
    #[allow(unreachable_patterns)]
    let ans = match page {
        DecodingResult::U8(v) => (SampleType::U8, widen(v)),
        DecodingResult::U16(v) => (SampleType::U16, widen(v)),
        DecodingResult::U32(v) => (SampleType::U32, widen(v)),
        DecodingResult::I8(v) => (SampleType::I8, widen(v)),
        DecodingResult::I16(v) => (SampleType::I16, widen(v)),
        DecodingResult::I32(v) => (SampleType::I32, widen(v)),
        DecodingResult::F32(v) => (SampleType::F32, widen(v)),
        DecodingResult::F64(v) => (SampleType::F64, v),
        DecodingResult::U64(_) => return Err(BerryError::UnsupportedSampleType("u64".into())),
        DecodingResult::I64(_) => return Err(BerryError::UnsupportedSampleType("i64".into())),
        _ => return Err(BerryError::UnsupportedSampleType("未知 TIFF 采样格式".into())),
    };
    Ok(ans)
}

fn read_tiff_stack(path: &Path) -> Result<ImageStack> {
    let mut decoder = Decoder::new(BufReader::new(File::open(path)?))?;
    let (width, height) = decoder.dimensions()?;
    let (width, height) = (width as usize, height as usize);

    let mut sample_type = None;
    let mut voxels = Vec::with_capacity(width * height);
    let mut depth = 0usize;
    loop {
        match decoder.colortype()? {
            ColorType::Gray(_) => {}
            other => {
                return Err(BerryError::UnsupportedSampleType(format!(
                    "{} 不是灰度图像: {other:?}",
                    path.display()
                )))
            }
        }
        if decoder.dimensions()? != (width as u32, height as u32) {
            return Err(BerryError::UnsupportedSampleType(format!(
                "{} 的各页尺寸不一致",
                path.display()
            )));
        }
        let (page_type, page) = decode_page(decoder.read_image()?)?;
        if *sample_type.get_or_insert(page_type) != page_type {
            return Err(BerryError::UnsupportedSampleType(format!(
                "{} 的各页元素类型不一致",
                path.display()
            )));
        }
        voxels.extend(page);
        depth += 1;

        if !decoder.more_images() {
            break;
        }
        decoder.next_image()?;
    }

    // 至少解码了一页, `sample_type` 必然存在.
    let sample_type = sample_type.unwrap_or(SampleType::U8);
    let data = Array3::from_shape_vec((depth, height, width), voxels)
        .map_err(|_| BerryError::UnsupportedSampleType(format!("{} 的数据长度不符", path.display())))?;
    Ok(ImageStack::new(data, sample_type))
}

fn write_tiff_stack(path: &Path, stack: &ImageStack) -> Result<()> {
    let mut encoder = TiffEncoder::new(BufWriter::new(File::create(path)?))?;
    let (_, h, w) = stack.shape();
    let (h, w) = (h as u32, w as u32);

    macro_rules! write_pages {
        ($color: ty, $t: ty) => {
            for sli in stack.slice_iter() {
                let page = narrow::<$t, _>(sli.iter());
                encoder.write_image::<$color>(w, h, &page)?;
            }
        };
    }

    match stack.sample_type() {
        SampleType::U8 => write_pages!(colortype::Gray8, u8),
        SampleType::U16 => write_pages!(colortype::Gray16, u16),
        SampleType::U32 => write_pages!(colortype::Gray32, u32),
        SampleType::I8 => write_pages!(colortype::GrayI8, i8),
        SampleType::I16 => write_pages!(colortype::GrayI16, i16),
        SampleType::I32 => write_pages!(colortype::GrayI32, i32),
        SampleType::F32 => write_pages!(colortype::Gray32Float, f32),
        SampleType::F64 => write_pages!(colortype::Gray64Float, f64),
    }
    Ok(())
}
