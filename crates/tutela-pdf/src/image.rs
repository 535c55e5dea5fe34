//! PNG signature images as PDF image XObjects.
//!
//! 8-bit, non-interlaced PNGs only. Gray, RGB and palette images keep their
//! compressed data and let the PDF reader undo the row filters; images with
//! an alpha channel are unfiltered here and split into colour plus `/SMask`.

use std::io::{Read as _, Write as _};

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use flate2::{Compression, read::ZlibDecoder, write::ZlibEncoder};

use crate::error::{Error, Result};

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const MAX_PIXELS: usize = 4096 * 4096;

#[derive(Debug, Clone, PartialEq)]
enum ColorSpace {
  Gray,
  Rgb,
  Indexed(Vec<u8>),
}

impl ColorSpace {
  fn pdf(&self) -> String {
    match self {
      Self::Gray => "/DeviceGray".to_owned(),
      Self::Rgb => "/DeviceRGB".to_owned(),
      Self::Indexed(p) => format!("[/Indexed /DeviceRGB {} <{}>]", p.len() / 3 - 1, hex::encode(p)),
    }
  }
}

/// A decoded image ready to be written as an XObject.
#[derive(Debug, Clone)]
pub struct Image {
  pub width:  u32,
  pub height: u32,
  color:      ColorSpace,
  /// zlib data; still PNG-filtered when `predictor` is set.
  data:       Vec<u8>,
  /// Colour components per pixel for the PNG predictor.
  predictor:  Option<u8>,
  /// zlib-compressed 8-bit alpha plane.
  alpha:      Option<Vec<u8>>,
}

struct Header {
  width:      u32,
  height:     u32,
  bit_depth:  u8,
  color_type: u8,
  interlace:  u8,
}

fn be32(b: &[u8]) -> u32 {
  u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

impl Header {
  fn parse(body: &[u8]) -> Result<Self> {
    if body.len() != 13 {
      return Err(Error::Png("bad IHDR length"));
    }
    Ok(Self {
      width:      be32(&body[0..4]),
      height:     be32(&body[4..8]),
      bit_depth:  body[8],
      color_type: body[9],
      interlace:  body[12],
    })
  }
}

impl Image {
  /// Decode a `data:image/png;base64,...` URL or bare base64.
  pub fn from_data_url(data_url: &str) -> Result<Self> {
    let payload = data_url
      .split_once(',')
      .map_or(data_url, |(_, rest)| rest)
      .trim();
    Self::from_png(&B64.decode(payload)?)
  }

  pub fn from_png(bytes: &[u8]) -> Result<Self> {
    let mut rest = bytes
      .strip_prefix(PNG_MAGIC)
      .ok_or(Error::Png("missing signature"))?;

    let mut header = None;
    let mut palette = None;
    let mut idat = Vec::new();
    while rest.len() >= 12 {
      let len = be32(&rest[0..4]) as usize;
      let kind = &rest[4..8];
      let body = rest
        .get(8..8 + len)
        .ok_or(Error::Png("truncated chunk"))?;
      match kind {
        b"IHDR" => header = Some(Header::parse(body)?),
        b"PLTE" => palette = Some(body.to_vec()),
        b"IDAT" => idat.extend_from_slice(body),
        b"IEND" => break,
        _ => {}
      }
      rest = rest
        .get(8 + len + 4..)
        .ok_or(Error::Png("truncated chunk"))?;
    }

    let h = header.ok_or(Error::Png("missing IHDR"))?;
    if idat.is_empty() {
      return Err(Error::Png("missing image data"));
    }
    if h.width == 0 || h.height == 0 {
      return Err(Error::Png("empty image"));
    }
    if (h.width as usize).saturating_mul(h.height as usize) > MAX_PIXELS {
      return Err(Error::UnsupportedPng(format!("{}x{} is too large", h.width, h.height)));
    }
    if h.bit_depth != 8 {
      return Err(Error::UnsupportedPng(format!("bit depth {}", h.bit_depth)));
    }
    if h.interlace != 0 {
      return Err(Error::UnsupportedPng("interlaced".to_owned()));
    }

    let filtered = |color: ColorSpace, components: u8| Image {
      width: h.width,
      height: h.height,
      color,
      data: idat.clone(),
      predictor: Some(components),
      alpha: None,
    };
    match h.color_type {
      0 => Ok(filtered(ColorSpace::Gray, 1)),
      2 => Ok(filtered(ColorSpace::Rgb, 3)),
      3 => {
        let p = palette.ok_or(Error::Png("missing palette"))?;
        if p.is_empty() || p.len() % 3 != 0 || p.len() > 256 * 3 {
          return Err(Error::Png("bad palette"));
        }
        Ok(filtered(ColorSpace::Indexed(p), 1))
      }
      4 => split_alpha(&h, &idat, ColorSpace::Gray, 1),
      6 => split_alpha(&h, &idat, ColorSpace::Rgb, 3),
      other => Err(Error::UnsupportedPng(format!("colour type {other}"))),
    }
  }

  pub fn has_alpha(&self) -> bool {
    self.alpha.is_some()
  }

  /// The image XObject; `smask` is the object id of its alpha plane.
  pub(crate) fn xobject(&self, smask: Option<usize>) -> Vec<u8> {
    let mut extra = String::new();
    if let Some(colors) = self.predictor {
      extra.push_str(&format!(
        " /DecodeParms << /Predictor 15 /Colors {colors} /BitsPerComponent 8 /Columns {} >>",
        self.width
      ));
    }
    if let Some(id) = smask {
      extra.push_str(&format!(" /SMask {id} 0 R"));
    }
    stream(self.width, self.height, &self.color.pdf(), &extra, &self.data)
  }

  /// The `/SMask` XObject, when the PNG carried alpha.
  pub(crate) fn smask(&self) -> Option<Vec<u8>> {
    self
      .alpha
      .as_ref()
      .map(|a| stream(self.width, self.height, "/DeviceGray", "", a))
  }
}

fn stream(width: u32, height: u32, color: &str, extra: &str, data: &[u8]) -> Vec<u8> {
  let mut out = format!(
    "<< /Type /XObject /Subtype /Image /Width {width} /Height {height} /ColorSpace {color} \
     /BitsPerComponent 8 /Filter /FlateDecode{extra} /Length {} >>\nstream\n",
    data.len()
  )
  .into_bytes();
  out.extend_from_slice(data);
  out.extend_from_slice(b"\nendstream");
  out
}

fn split_alpha(h: &Header, idat: &[u8], color: ColorSpace, components: usize) -> Result<Image> {
  let mut raw = Vec::new();
  ZlibDecoder::new(idat)
    .read_to_end(&mut raw)
    .map_err(Error::Zlib)?;

  let bpp = components + 1;
  let pixels = unfilter(&raw, h.width as usize, h.height as usize, bpp)?;
  let mut rgb = Vec::with_capacity(pixels.len() / bpp * components);
  let mut alpha = Vec::with_capacity(pixels.len() / bpp);
  for px in pixels.chunks_exact(bpp) {
    rgb.extend_from_slice(&px[..components]);
    alpha.push(px[components]);
  }

  Ok(Image {
    width: h.width,
    height: h.height,
    color,
    data: deflate(&rgb)?,
    predictor: None,
    alpha: Some(deflate(&alpha)?),
  })
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
  let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
  enc.write_all(data).map_err(Error::Zlib)?;
  enc.finish().map_err(Error::Zlib)
}

/// Undo PNG row filters (RFC 2083 §6).
fn unfilter(raw: &[u8], width: usize, height: usize, bpp: usize) -> Result<Vec<u8>> {
  let stride = width * bpp;
  if raw.len() < height * (stride + 1) {
    return Err(Error::Png("short image data"));
  }

  let mut out = vec![0u8; height * stride];
  for row in 0..height {
    let start = row * (stride + 1);
    let filter = raw[start];
    let src = &raw[start + 1..start + 1 + stride];
    let (done, cur) = out.split_at_mut(row * stride);
    let prev: Option<&[u8]> = if row > 0 { Some(&done[(row - 1) * stride..]) } else { None };
    let cur = &mut cur[..stride];

    for i in 0..stride {
      let a = if i >= bpp { cur[i - bpp] } else { 0 };
      let b = prev.map_or(0, |p| p[i]);
      let c = if i >= bpp { prev.map_or(0, |p| p[i - bpp]) } else { 0 };
      let pred = match filter {
        0 => 0,
        1 => a,
        2 => b,
        3 => ((u16::from(a) + u16::from(b)) / 2) as u8,
        4 => paeth(a, b, c),
        _ => return Err(Error::Png("unknown row filter")),
      };
      cur[i] = src[i].wrapping_add(pred);
    }
  }
  Ok(out)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
  let p = i16::from(a) + i16::from(b) - i16::from(c);
  let pa = (p - i16::from(a)).abs();
  let pb = (p - i16::from(b)).abs();
  let pc = (p - i16::from(c)).abs();
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;

  fn chunk(out: &mut Vec<u8>, kind: &[u8], body: &[u8]) {
    out.extend_from_slice(&(body.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(body);
    // CRC is not checked by the decoder.
    out.extend_from_slice(&[0; 4]);
  }

  /// Build a PNG from filtered scanlines (each row led by its filter byte).
  pub(crate) fn png(width: u32, height: u32, color_type: u8, rows: &[u8]) -> Vec<u8> {
    let mut ihdr = Vec::new();
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    ihdr.extend_from_slice(&[8, color_type, 0, 0, 0]);

    let mut out = PNG_MAGIC.to_vec();
    chunk(&mut out, b"IHDR", &ihdr);
    chunk(&mut out, b"IDAT", &deflate(rows).unwrap());
    chunk(&mut out, b"IEND", &[]);
    out
  }

  /// A 1×1 opaque red RGBA pixel as a data URL.
  pub(crate) fn red_pixel_url() -> String {
    let png = png(1, 1, 6, &[0, 255, 0, 0, 255]);
    format!("data:image/png;base64,{}", B64.encode(png))
  }

  fn find(hay: &[u8], needle: &[u8]) -> bool {
    hay.windows(needle.len()).any(|w| w == needle)
  }

  #[test]
  fn rgb_keeps_png_predictor() {
    let img = Image::from_png(&png(2, 1, 2, &[0, 1, 2, 3, 4, 5, 6])).unwrap();
    assert_eq!((img.width, img.height), (2, 1));
    assert!(!img.has_alpha());
    let obj = img.xobject(None);
    assert!(find(&obj, b"/ColorSpace /DeviceRGB"));
    assert!(find(&obj, b"/Predictor 15 /Colors 3 /BitsPerComponent 8 /Columns 2"));
  }

  #[test]
  fn rgba_splits_alpha_into_smask() {
    // Two rows using Sub and Up filters.
    let rows = [
      1, 10, 20, 30, 255, 5, 5, 5, 0, //
      2, 1, 1, 1, 0, 1, 1, 1, 0,
    ];
    let img = Image::from_png(&png(2, 2, 6, &rows)).unwrap();
    assert!(img.has_alpha());

    let mut rgb = Vec::new();
    ZlibDecoder::new(img.data.as_slice()).read_to_end(&mut rgb).unwrap();
    assert_eq!(rgb, [10, 20, 30, 15, 25, 35, 11, 21, 31, 16, 26, 36]);

    let mut alpha = Vec::new();
    ZlibDecoder::new(img.alpha.as_deref().unwrap())
      .read_to_end(&mut alpha)
      .unwrap();
    assert_eq!(alpha, [255, 255, 255, 255]);

    assert!(find(&img.xobject(Some(9)), b"/SMask 9 0 R"));
    assert!(find(&img.smask().unwrap(), b"/ColorSpace /DeviceGray"));
  }

  #[test]
  fn paeth_and_average_filters() {
    // Gray+alpha, 2×2: row 0 unfiltered, row 1 Average.
    let rows = [0, 100, 200, 50, 100, 3, 10, 0, 10, 0];
    let img = Image::from_png(&png(2, 2, 4, &rows)).unwrap();
    let mut gray = Vec::new();
    ZlibDecoder::new(img.data.as_slice()).read_to_end(&mut gray).unwrap();
    // (0 + 100) / 2 + 10 = 60; (60 + 50) / 2 + 10 = 65
    assert_eq!(gray, [100, 50, 60, 65]);

    assert_eq!(paeth(10, 20, 10), 20);
    assert_eq!(paeth(20, 10, 10), 20);
    assert_eq!(paeth(5, 5, 5), 5);
  }

  #[test]
  fn data_url_decodes() {
    let img = Image::from_data_url(&red_pixel_url()).unwrap();
    assert_eq!((img.width, img.height), (1, 1));
  }

  #[test]
  fn rejects_bad_input() {
    assert!(matches!(Image::from_png(b"GIF89a"), Err(Error::Png(_))));
    assert!(matches!(Image::from_data_url("data:image/png;base64,@@@"), Err(Error::Base64(_))));
    assert!(matches!(
      Image::from_png(&png(1, 1, 2, &[0, 1, 2, 3])[..30]),
      Err(Error::Png(_))
    ));

    let mut sixteen = png(1, 1, 0, &[0, 0, 0]);
    sixteen[24] = 16;
    assert!(matches!(Image::from_png(&sixteen), Err(Error::UnsupportedPng(_))));
  }
}
