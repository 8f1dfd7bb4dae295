pub mod moments;
pub mod ssim;
