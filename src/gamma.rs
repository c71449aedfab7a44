// Linear-light compositing for the ice overlay. Mixing in sRGB makes the
// translucent bricks look muddy against the video; these tables avoid a powf
// per channel per pixel.

pub struct LinearBlend {
    // sRGB(0..255) -> linear (0..1)
    to_linear: [f32; 256],
    // linear(0..1) -> sRGB(0..255), 4096 steps
    to_srgb: [u8; 4096],
}

impl Default for LinearBlend {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearBlend {
    pub fn new() -> Self {
        let mut to_linear = [0.0f32; 256];
        for (v, slot) in to_linear.iter_mut().enumerate() {
            let c = v as f32 / 255.0;
            *slot = if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) };
        }

        let mut to_srgb = [0u8; 4096];
        for (i, slot) in to_srgb.iter_mut().enumerate() {
            let l = i as f32 / 4095.0;
            let s = if l <= 0.003_130_8 { 12.92 * l } else { 1.055 * l.powf(1.0 / 2.4) - 0.055 };
            *slot = (s * 255.0).round().clamp(0.0, 255.0) as u8;
        }

        Self { to_linear, to_srgb }
    }

    #[inline]
    fn lin(&self, v: u32) -> f32 {
        self.to_linear[(v & 0xFF) as usize]
    }

    #[inline]
    fn srgb(&self, l: f32) -> u32 {
        self.to_srgb[(l.clamp(0.0, 1.0) * 4095.0).round() as usize] as u32
    }

    /// `alpha` of `over` on top of `under`, both 0x00RRGGBB.
    pub fn mix(&self, under: u32, over: u32, alpha: f32) -> u32 {
        if alpha <= 0.0 {
            return under;
        }
        if alpha >= 1.0 {
            return over;
        }
        let inv = 1.0 - alpha;
        let mut out = 0u32;
        for shift in [16, 8, 0] {
            let l = alpha * self.lin(over >> shift) + inv * self.lin(under >> shift);
            out |= self.srgb(l) << shift;
        }
        out
    }
}
