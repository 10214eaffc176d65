use glam::DVec2;

/// 交给文字排版协作者的请求。
#[derive(Debug, Clone, Copy)]
pub struct TextRequest<'a> {
    pub text: &'a str,
    pub height: f64,
}

/// 排版后的测量结果（绘图单位）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
}

/// 文字排版接缝。字形生成由外部实现，引擎只消费测量结果。
/// 返回 `None` 表示无法排版（例如字体未加载）。
pub trait TextShaper: Send + Sync {
    fn shape(&self, request: &TextRequest<'_>) -> Option<TextMetrics>;
}

/// 仅按等宽字符估算尺寸的排版器，无字体后端时使用。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAdvanceShaper {
    advance_factor: f64,
}

impl FixedAdvanceShaper {
    pub const DEFAULT_ADVANCE: f64 = 0.6;

    pub fn new(advance_factor: f64) -> Self {
        Self { advance_factor }
    }
}

impl Default for FixedAdvanceShaper {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ADVANCE)
    }
}

impl TextShaper for FixedAdvanceShaper {
    fn shape(&self, request: &TextRequest<'_>) -> Option<TextMetrics> {
        if !request.height.is_finite() || request.height <= 0.0 {
            return None;
        }
        let lines: Vec<&str> = request.text.lines().collect();
        let widest = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        Some(TextMetrics {
            width: widest as f64 * request.height * self.advance_factor,
            height: lines.len().max(1) as f64 * request.height,
        })
    }
}

/// MTEXT 附着点（1-9，上/中/下 × 左/中/右）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Attachment {
    pub fn from_code(code: i16) -> Option<Self> {
        let attachment = match code {
            1 => Attachment::TopLeft,
            2 => Attachment::TopCenter,
            3 => Attachment::TopRight,
            4 => Attachment::MiddleLeft,
            5 => Attachment::MiddleCenter,
            6 => Attachment::MiddleRight,
            7 => Attachment::BottomLeft,
            8 => Attachment::BottomCenter,
            9 => Attachment::BottomRight,
            _ => return None,
        };
        Some(attachment)
    }

    /// 从声明插入点到文字左下角的偏移。
    pub fn offset(self, width: f64, height: f64) -> DVec2 {
        let x = match self {
            Attachment::TopLeft | Attachment::MiddleLeft | Attachment::BottomLeft => 0.0,
            Attachment::TopCenter | Attachment::MiddleCenter | Attachment::BottomCenter => {
                -width / 2.0
            }
            Attachment::TopRight | Attachment::MiddleRight | Attachment::BottomRight => -width,
        };
        let y = match self {
            Attachment::TopLeft | Attachment::TopCenter | Attachment::TopRight => -height,
            Attachment::MiddleLeft | Attachment::MiddleCenter | Attachment::MiddleRight => {
                -height / 2.0
            }
            Attachment::BottomLeft | Attachment::BottomCenter | Attachment::BottomRight => 0.0,
        };
        DVec2::new(x, y)
    }
}

/// 将 MTEXT 的 `\P`、`\N` 转换为换行，并去掉 `\p...;` 段落格式码。
/// 其他转义原样保留。
pub fn sanitize_mtext(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('P' | 'N') => out.push('\n'),
            // 格式码一直延续到分号。
            Some('p') => {
                for skipped in chars.by_ref() {
                    if skipped == ';' {
                        break;
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_codes_map_to_nine_anchors() {
        assert_eq!(Attachment::from_code(1), Some(Attachment::TopLeft));
        assert_eq!(Attachment::from_code(9), Some(Attachment::BottomRight));
        assert_eq!(Attachment::from_code(0), None);
        assert_eq!(Attachment::from_code(10), None);
        assert_eq!(
            Attachment::MiddleCenter.offset(8.0, 4.0),
            DVec2::new(-4.0, -2.0)
        );
        assert_eq!(Attachment::TopRight.offset(8.0, 4.0), DVec2::new(-8.0, -4.0));
    }

    #[test]
    fn fixed_advance_measures_widest_line() {
        let shaper = FixedAdvanceShaper::new(0.5);
        let metrics = shaper
            .shape(&TextRequest {
                text: "ab\nabcd",
                height: 2.0,
            })
            .expect("metrics");
        assert_eq!(metrics.width, 4.0);
        assert_eq!(metrics.height, 4.0);
        assert!(shaper.shape(&TextRequest { text: "x", height: 0.0 }).is_none());
    }

    #[test]
    fn sanitize_converts_paragraph_codes() {
        assert_eq!(sanitize_mtext("A\\PB\\NC"), "A\nB\nC");
    }

    #[test]
    fn sanitize_strips_paragraph_formatting() {
        assert_eq!(sanitize_mtext("\\pxqc;Note"), "Note");
        assert_eq!(sanitize_mtext("\\pi-1,l2;A\\PB"), "A\nB");
        assert_eq!(sanitize_mtext("C:\\temp\\"), "C:\\temp\\");
    }
}
