use crate::game::{Piece, PieceKind, Side};
use egui::{vec2, Color32, ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use std::collections::{HashMap, HashSet};
use std::sync::mpsc;

const PAWN: &str = r#"<circle cx="22.5" cy="13" r="5"/><path d="M17 19h11l3 15H14z"/><rect x="11" y="34" width="23" height="5" rx="1.5"/>"#;
const KNIGHT: &str = r#"<path d="M14 38c0-8 2-13 8-17-4 0-7 2-9 4l-3-3c3-6 8-12 15-12 7 0 11 7 11 15v13z"/><circle cx="21" cy="15" r="1.5" fill="STROKE"/><rect x="11" y="35" width="25" height="5" rx="1.5"/>"#;
const BISHOP: &str = r#"<circle cx="22.5" cy="8" r="2.5"/><path d="M22.5 11c6 4 8 9 8 13 0 4-3 6-8 6s-8-2-8-6c0-4 2-9 8-13z"/><path d="M17 30h11l2 5H15z"/><rect x="10" y="35" width="25" height="5" rx="1.5"/>"#;
const ROOK: &str = r#"<path d="M11 9h5v4h4V9h5v4h4V9h5v8H11z"/><path d="M14 17h17v16H14z"/><rect x="10" y="33" width="25" height="7" rx="1.5"/>"#;
const QUEEN: &str = r#"<path d="M9 14l5 17h17l5-17-8 9-5-13-5 13z"/><circle cx="9" cy="12" r="2.5"/><circle cx="17.5" cy="9" r="2.5"/><circle cx="27.5" cy="9" r="2.5"/><circle cx="36" cy="12" r="2.5"/><rect x="11" y="31" width="23" height="8" rx="1.5"/>"#;
const KING: &str = r#"<path d="M21 4h3v4h4v3h-4v5h-3v-5h-4V8h4z"/><path d="M10 22c0-5 5-7 12.5-5 7.5-2 12.5 0 12.5 5 0 5-4 9-5 10H15c-1-1-5-5-5-10z"/><rect x="12" y="32" width="21" height="7" rx="1.5"/>"#;

fn piece_svg(piece: Piece) -> String {
    let (fill, stroke) = match piece.side {
        Side::White => ("#ffffff", "#000000"),
        Side::Black => ("#2b2b2b", "#000000"),
    };
    let body = match piece.kind {
        PieceKind::Pawn => PAWN,
        PieceKind::Knight => KNIGHT,
        PieceKind::Bishop => BISHOP,
        PieceKind::Rook => ROOK,
        PieceKind::Queen => QUEEN,
        PieceKind::King => KING,
    };
    let eye = if piece.side == Side::White { "#000000" } else { "#ffffff" };
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="45" height="45" viewBox="0 0 45 45"><g fill="{}" stroke="{}" stroke-width="1.5" stroke-linejoin="round">{}</g></svg>"#,
        fill,
        stroke,
        body.replace("STROKE", eye)
    )
}

fn render_svg(svg_str: &str, size: u32) -> Option<ColorImage> {
    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg_str, &opt).ok()?;

    let fit_to = tiny_skia::Size::from_wh(size as f32, size as f32)?;
    let sx = fit_to.width() / tree.size().width();
    let sy = fit_to.height() / tree.size().height();
    let transform = tiny_skia::Transform::from_scale(sx, sy);

    let mut pixmap = tiny_skia::Pixmap::new(size, size)?;
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    let pixels: Vec<Color32> = pixmap
        .data()
        .chunks(4)
        .map(|chunk| Color32::from_rgba_premultiplied(chunk[0], chunk[1], chunk[2], chunk[3]))
        .collect();

    Some(ColorImage {
        size: [size as usize, size as usize],
        pixels,
        source_size: vec2(size as f32, size as f32),
    })
}

/// Counts sprite loads a repaint still waits on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SpriteBarrier {
    pending: usize,
}

impl SpriteBarrier {
    pub fn request(&mut self) {
        self.pending += 1;
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn is_clear(&self) -> bool {
        self.pending == 0
    }
}

type SpriteKey = (Piece, u32);

/// Rasterises piece sprites on worker threads and caches the textures.
pub struct PieceRenderer {
    textures: HashMap<SpriteKey, TextureHandle>,
    loading: HashSet<SpriteKey>,
    loaded_tx: mpsc::Sender<(SpriteKey, Option<ColorImage>)>,
    loaded_rx: mpsc::Receiver<(SpriteKey, Option<ColorImage>)>,
}

impl PieceRenderer {
    pub fn new() -> Self {
        let (loaded_tx, loaded_rx) = mpsc::channel();
        Self {
            textures: HashMap::new(),
            loading: HashSet::new(),
            loaded_tx,
            loaded_rx,
        }
    }

    /// Starts a repaint: uploads every sprite finished since the last one.
    pub fn begin_pass(&mut self, ctx: &Context, size: u32) -> SpritePass<'_> {
        while let Ok((key, image)) = self.loaded_rx.try_recv() {
            self.loading.remove(&key);
            match image {
                Some(image) => {
                    let name = format!("piece_{:?}_{:?}_{}", key.0.side, key.0.kind, key.1);
                    let texture = ctx.load_texture(name, image, TextureOptions::LINEAR);
                    self.textures.insert(key, texture);
                }
                None => tracing::error!("Failed to rasterise sprite for {:?}", key.0),
            }
        }

        SpritePass {
            renderer: self,
            ctx: ctx.clone(),
            size,
            barrier: SpriteBarrier::default(),
        }
    }

    fn load(&mut self, ctx: &Context, key: SpriteKey) {
        if !self.loading.insert(key) {
            return;
        }
        let tx = self.loaded_tx.clone();
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let image = render_svg(&piece_svg(key.0), key.1);
            let _ = tx.send((key, image));
            ctx.request_repaint();
        });
    }
}

impl Default for PieceRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// One repaint's view of the sprite cache.
pub struct SpritePass<'a> {
    renderer: &'a mut PieceRenderer,
    ctx: Context,
    size: u32,
    barrier: SpriteBarrier,
}

impl SpritePass<'_> {
    /// Texture for `piece`, or `None` while it is still loading.
    pub fn sprite(&mut self, piece: Piece) -> Option<TextureId> {
        let key = (piece, self.size);
        if let Some(texture) = self.renderer.textures.get(&key) {
            return Some(texture.id());
        }
        self.barrier.request();
        self.renderer.load(&self.ctx, key);
        None
    }

    pub fn barrier(&self) -> SpriteBarrier {
        self.barrier
    }
}
