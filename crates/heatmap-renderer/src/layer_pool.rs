//! Thread-local buffer pools for the compositing and encoding steps.
//!
//! The colorized layer is as large as the shadow layer and is rebuilt on
//! every draw, so it is cached per thread instead of allocated each frame.
//! The same goes for the PNG scanline buffer.
//!
//! ```ignore
//! use heatmap_renderer::layer_pool::with_layer_buffer;
//!
//! with_layer_buffer(640, 480, |rgba| {
//!     // rgba is 640 * 480 * 4 zeroed bytes
//! });
//! ```

use std::cell::RefCell;

/// Initial capacity, enough for a 256x256 layer.
const DEFAULT_LAYER_PIXELS: usize = 256 * 256;

thread_local! {
    static LAYER_BUFFER: RefCell<Vec<u8>> = RefCell::new(Vec::with_capacity(DEFAULT_LAYER_PIXELS * 4));
}

thread_local! {
    static SCANLINE_BUFFER: RefCell<Vec<u8>> = RefCell::new(Vec::with_capacity(DEFAULT_LAYER_PIXELS * 4 + 256));
}

/// Run `f` with a zeroed (transparent) premultiplied RGBA buffer of
/// `width * height * 4` bytes.
///
/// Nested use on the same thread falls back to a fresh allocation.
#[inline]
pub fn with_layer_buffer<F, R>(width: u32, height: u32, f: F) -> R
where
    F: FnOnce(&mut [u8]) -> R,
{
    let size = width as usize * height as usize * 4;
    LAYER_BUFFER.with(|cell| match cell.try_borrow_mut() {
        Ok(mut buf) => {
            if buf.len() < size {
                buf.resize(size, 0);
            }
            buf[..size].fill(0);
            f(&mut buf[..size])
        }
        Err(_) => {
            let mut buf = vec![0u8; size];
            f(&mut buf)
        }
    })
}

/// Run `f` with an empty scanline buffer that has room for `capacity` bytes.
#[inline]
pub fn with_scanline_buffer<F, R>(capacity: usize, f: F) -> R
where
    F: FnOnce(&mut Vec<u8>) -> R,
{
    SCANLINE_BUFFER.with(|cell| match cell.try_borrow_mut() {
        Ok(mut buf) => {
            buf.clear();
            buf.reserve(capacity);
            f(&mut buf)
        }
        Err(_) => {
            let mut buf = Vec::with_capacity(capacity);
            f(&mut buf)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer_capacity() -> usize {
        LAYER_BUFFER.with(|cell| cell.borrow().capacity())
    }

    #[test]
    fn test_layer_buffer_size_and_zeroing() {
        with_layer_buffer(16, 8, |buf| {
            assert_eq!(buf.len(), 16 * 8 * 4);
            assert!(buf.iter().all(|&b| b == 0));
            buf.fill(0xAB);
        });

        // Reused buffer comes back cleared
        with_layer_buffer(16, 8, |buf| {
            assert!(buf.iter().all(|&b| b == 0));
        });
    }

    #[test]
    fn test_layer_buffer_is_reused() {
        with_layer_buffer(64, 64, |_| {});
        let capacity = layer_capacity();
        assert!(capacity >= 64 * 64 * 4);

        with_layer_buffer(32, 32, |buf| assert_eq!(buf.len(), 32 * 32 * 4));
        assert_eq!(layer_capacity(), capacity);
    }

    #[test]
    fn test_nested_layer_buffers_do_not_alias() {
        with_layer_buffer(4, 4, |outer| {
            outer.fill(1);
            with_layer_buffer(4, 4, |inner| {
                assert!(inner.iter().all(|&b| b == 0));
                inner.fill(2);
            });
            assert!(outer.iter().all(|&b| b == 1));
        });
    }

    #[test]
    fn test_scanline_buffer_starts_empty() {
        with_scanline_buffer(100, |buf| {
            assert!(buf.is_empty());
            assert!(buf.capacity() >= 100);
            buf.extend_from_slice(&[1, 2, 3]);
        });
        with_scanline_buffer(10, |buf| assert!(buf.is_empty()));
    }
}
