//! Aspect-fill quad geometry.
//!
//! The pixel buffer is drawn as a clip-space quad scaled so that it covers the
//! whole drawable; whatever extends past ±1 is clipped, giving a center crop.

use glam::Vec2;

/// Texture coordinates of the quad, in triangle-strip vertex order.
///
/// The image's top row maps to the top of the quad.
pub const QUAD_TEX_COORDS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]];

/// Computes the clip-space half extents of the quad.
///
/// `image` and `drawable` are (width, height) in pixels; both must be non-zero.
pub fn aspect_fill_scales(image: (u32, u32), drawable: (u32, u32)) -> Vec2 {
    #[allow(clippy::cast_precision_loss)]
    let (width, height) = (image.0 as f32, image.1 as f32);
    #[allow(clippy::cast_precision_loss)]
    let (drawable_width, drawable_height) = (drawable.0 as f32, drawable.1 as f32);

    let mut scale = if width < height {
        Vec2::new(1.0, height / width)
    } else {
        Vec2::new(width / height, 1.0)
    };

    if drawable_width < drawable_height {
        scale.x *= drawable_height / drawable_width;
    } else {
        scale.y *= drawable_width / drawable_height;
    }

    scale
}

/// Builds the four homogeneous quad corners for a triangle strip.
pub fn quad_positions(scale: Vec2) -> [[f32; 4]; 4] {
    let Vec2 { x, y } = scale;
    [
        [-x, -y, 0.0, 1.0],
        [x, -y, 0.0, 1.0],
        [-x, y, 0.0, 1.0],
        [x, y, 0.0, 1.0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_square_on_square() {
        assert_eq!(aspect_fill_scales((1, 1), (1, 1)), Vec2::new(1.0, 1.0));
        assert_eq!(aspect_fill_scales((640, 640), (300, 300)), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_landscape_image_on_square_drawable() {
        assert_eq!(aspect_fill_scales((2, 1), (1, 1)), Vec2::new(2.0, 1.0));
    }

    #[test]
    fn test_portrait_image_on_portrait_drawable() {
        assert_eq!(aspect_fill_scales((1, 2), (1, 2)), Vec2::new(2.0, 2.0));
    }

    #[test]
    fn test_landscape_drawable_scales_y() {
        assert_eq!(aspect_fill_scales((1920, 1080), (200, 100)), Vec2::new(1920.0 / 1080.0, 2.0));
    }

    #[test]
    fn test_quad_order() {
        let quad = quad_positions(Vec2::new(2.0, 3.0));
        assert_eq!(quad[0], [-2.0, -3.0, 0.0, 1.0]);
        assert_eq!(quad[1], [2.0, -3.0, 0.0, 1.0]);
        assert_eq!(quad[2], [-2.0, 3.0, 0.0, 1.0]);
        assert_eq!(quad[3], [2.0, 3.0, 0.0, 1.0]);
    }

    #[test]
    fn test_tex_coords_flip_vertically() {
        // Bottom corners sample the last image row, top corners the first.
        assert_eq!(QUAD_TEX_COORDS[0], [0.0, 1.0]);
        assert_eq!(QUAD_TEX_COORDS[1], [1.0, 1.0]);
        assert_eq!(QUAD_TEX_COORDS[2], [0.0, 0.0]);
        assert_eq!(QUAD_TEX_COORDS[3], [1.0, 0.0]);
    }

    proptest! {
        #[test]
        fn quad_always_covers_clip_space(
            w in 1u32..4096, h in 1u32..4096, dw in 1u32..4096, dh in 1u32..4096,
        ) {
            let scale = aspect_fill_scales((w, h), (dw, dh));
            prop_assert!(scale.x >= 1.0);
            prop_assert!(scale.y >= 1.0);
            prop_assert!(scale.is_finite());
        }
    }
}
