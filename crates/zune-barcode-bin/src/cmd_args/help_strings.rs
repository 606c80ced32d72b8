pub static FORMATS_HELP: &str = "Formats to look for

A comma, pipe or space separated list of format names (QRCode),
labels (EAN-13) or groups (AllLinear, AllMatrix, AllRetail).
Unknown names stop the run with an error.";

pub static OUTPUT_HELP: &str = "File to write the symbol to

The extension picks the representation:
  .png  8 bit grayscale image
  .svg  scalable vector document
  .txt  block character art for terminals";

pub static EC_LEVEL_HELP: &str = "Error correction level

QR Code takes L, M, Q or H, or a number from 0 to 8 where
higher numbers mean more redundancy. Linear formats ignore it.";
