//! CIE-LAB and CIE-LCH (HCL) conversions for perceptual color interpolation.
//!
//! Conversions go through linear sRGB and CIE XYZ with the D65 reference white. Alpha is
//! carried through untouched; colors are un-premultiplied before conversion and
//! re-premultiplied afterwards.

use crate::color::rgba::Color;

const XN: f64 = 0.950_470;
const YN: f64 = 1.0;
const ZN: f64 = 1.088_830;
const T0: f64 = 4.0 / 29.0;
const T1: f64 = 6.0 / 29.0;
const T2: f64 = 3.0 * T1 * T1;
const T3: f64 = T1 * T1 * T1;

const RGB_TO_XYZ: [[f64; 3]; 3] = [
    [0.412_456_4, 0.357_576_1, 0.180_437_5],
    [0.212_672_9, 0.715_152_2, 0.072_175_0],
    [0.019_333_9, 0.119_192_0, 0.950_304_1],
];

// Exact inverse of RGB_TO_XYZ.
const XYZ_TO_RGB: [[f64; 3]; 3] = [
    [3.240_454_836_021_409, -1.537_138_850_102_575_3, -0.498_531_546_868_481],
    [-0.969_266_389_875_653_8, 1.876_010_928_842_491_3, 0.041_556_082_346_673_524],
    [0.055_643_419_604_213_66, -0.204_025_854_267_698_15, 1.057_225_162_457_928_7],
];

/// A color in CIE-LAB space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lab {
    /// Lightness.
    pub l: f64,
    /// Green-red axis.
    pub a: f64,
    /// Blue-yellow axis.
    pub b: f64,
    /// Alpha in `[0, 1]`.
    pub alpha: f64,
}

/// A color in CIE-LCH space, stored hue-first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hcl {
    /// Hue angle in degrees, `[0, 360)`.
    pub h: f64,
    /// Chroma.
    pub c: f64,
    /// Lightness.
    pub l: f64,
    /// Alpha in `[0, 1]`.
    pub alpha: f64,
}

fn xyz_to_lab_f(t: f64) -> f64 {
    if t > T3 { t.cbrt() } else { t / T2 + T0 }
}

fn lab_to_xyz_f(t: f64) -> f64 {
    if t > T1 { t * t * t } else { T2 * (t - T0) }
}

fn srgb_to_linear(x: f64) -> f64 {
    if x <= 0.040_45 {
        x / 12.92
    } else {
        ((x + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(x: f64) -> f64 {
    if x <= 0.003_130_8 {
        12.92 * x
    } else {
        1.055 * x.powf(1.0 / 2.4) - 0.055
    }
}

fn mul(m: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Convert a premultiplied RGBA color to LAB.
pub fn rgb_to_lab(color: Color) -> Lab {
    let [r, g, b, alpha] = color.to_straight();
    let linear = [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b)];
    let [x, y, z] = mul(&RGB_TO_XYZ, linear);

    let fx = xyz_to_lab_f(x / XN);
    let fy = xyz_to_lab_f(y / YN);
    let fz = xyz_to_lab_f(z / ZN);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
        alpha,
    }
}

/// Convert a LAB color back to premultiplied RGBA.
pub fn lab_to_rgb(lab: Lab) -> Color {
    let fy = (lab.l + 16.0) / 116.0;
    let fx = if lab.a.is_nan() { fy } else { fy + lab.a / 500.0 };
    let fz = if lab.b.is_nan() { fy } else { fy - lab.b / 200.0 };

    let xyz = [
        XN * lab_to_xyz_f(fx),
        YN * lab_to_xyz_f(fy),
        ZN * lab_to_xyz_f(fz),
    ];
    let [r, g, b] = mul(&XYZ_TO_RGB, xyz);

    Color::from_straight(
        linear_to_srgb(r),
        linear_to_srgb(g),
        linear_to_srgb(b),
        lab.alpha,
    )
}

/// Convert a premultiplied RGBA color to HCL.
pub fn rgb_to_hcl(color: Color) -> Hcl {
    let Lab { l, a, b, alpha } = rgb_to_lab(color);
    let h = b.atan2(a).to_degrees();
    Hcl {
        h: if h < 0.0 { h + 360.0 } else { h },
        c: (a * a + b * b).sqrt(),
        l,
        alpha,
    }
}

/// Convert an HCL color back to premultiplied RGBA.
pub fn hcl_to_rgb(hcl: Hcl) -> Color {
    let h = if hcl.h.is_nan() {
        0.0
    } else {
        hcl.h.to_radians()
    };
    lab_to_rgb(Lab {
        l: hcl.l,
        a: h.cos() * hcl.c,
        b: h.sin() * hcl.c,
        alpha: hcl.alpha,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/color/space.rs"]
mod tests;
