// src/camera.rs
//
// Camera collaborator boundary. The pipeline only ever calls capture();
// enumeration and opening belong to whatever shell wires a device in.
// Closing is Drop.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDescriptor {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("camera {0} not found")]
    NotFound(String),
    #[error("camera {0} is in use by another process")]
    Busy(String),
    #[error("camera permission denied")]
    PermissionDenied,
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("device busy")]
    DeviceBusy,
    #[error("camera permission revoked")]
    PermissionRevoked,
    #[error("hardware error: {0}")]
    Hardware(String),
}

/// An open camera able to produce JPEG-encoded still frames.
pub trait CameraDevice: Send {
    fn capture(&mut self) -> Result<Vec<u8>, CaptureError>;
}

/// Enumerates and opens camera devices.
pub trait CameraProvider: Send + Sync {
    fn list_available(&self) -> Vec<CameraDescriptor>;
    fn open(&self, descriptor: &CameraDescriptor) -> Result<Box<dyn CameraDevice>, DeviceError>;
}

// ============================================================================
// SIMULATED CAMERA
// ============================================================================

/// Stand-in device producing small synthetic frames. The gradient shifts
/// with a frame counter so successive captures are distinguishable.
pub struct SimulatedCamera {
    width: usize,
    height: usize,
    frame_counter: u64,
}

impl SimulatedCamera {
    pub fn new() -> Self {
        Self {
            width: 64,
            height: 48,
            frame_counter: 0,
        }
    }
}

impl Default for SimulatedCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraDevice for SimulatedCamera {
    fn capture(&mut self) -> Result<Vec<u8>, CaptureError> {
        self.frame_counter += 1;
        let shift = (self.frame_counter % 256) as u8;

        let mut rgb = Vec::with_capacity(self.width * self.height * 3);
        for y in 0..self.height {
            for x in 0..self.width {
                rgb.push((x * 255 / self.width) as u8);
                rgb.push((y * 255 / self.height) as u8);
                rgb.push(shift);
            }
        }

        encode_rgb_to_jpeg(&rgb, self.width, self.height, 85)
            .ok_or_else(|| CaptureError::Hardware("jpeg encoding failed".to_string()))
    }
}

pub struct SimulatedCameraProvider;

impl CameraProvider for SimulatedCameraProvider {
    fn list_available(&self) -> Vec<CameraDescriptor> {
        vec![CameraDescriptor {
            id: "sim-0".to_string(),
            label: "Simulated rear dashcam".to_string(),
        }]
    }

    fn open(&self, descriptor: &CameraDescriptor) -> Result<Box<dyn CameraDevice>, DeviceError> {
        if descriptor.id != "sim-0" {
            return Err(DeviceError::NotFound(descriptor.id.clone()));
        }
        Ok(Box::new(SimulatedCamera::new()))
    }
}

/// Encode raw RGB bytes into a JPEG. Returns None on failure.
fn encode_rgb_to_jpeg(rgb_data: &[u8], width: usize, height: usize, quality: u8) -> Option<Vec<u8>> {
    use image::{ImageBuffer, RgbImage};

    let img: RgbImage =
        ImageBuffer::from_raw(width as u32, height as u32, rgb_data.to_vec())?;

    let mut buf = std::io::Cursor::new(Vec::new());
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
    img.write_with_encoder(encoder).ok()?;

    Some(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_camera_produces_jpeg() {
        let mut camera = SimulatedCamera::new();
        let frame = camera.capture().expect("capture should succeed");
        // JPEG SOI marker
        assert_eq!(&frame[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_provider_opens_listed_device() {
        let provider = SimulatedCameraProvider;
        let descriptors = provider.list_available();
        assert_eq!(descriptors.len(), 1);
        assert!(provider.open(&descriptors[0]).is_ok());
    }

    #[test]
    fn test_provider_rejects_unknown_device() {
        let provider = SimulatedCameraProvider;
        let unknown = CameraDescriptor {
            id: "usb-3".to_string(),
            label: "nope".to_string(),
        };
        assert!(matches!(
            provider.open(&unknown),
            Err(DeviceError::NotFound(_))
        ));
    }
}
