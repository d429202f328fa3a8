use super::*;

#[test]
fn font_scale_has_a_floor_and_tracks_the_smaller_axis() {
    let s = CaptionStyle::default();
    assert_eq!(s.font_scale(320, 240), 0.8);
    assert_eq!(s.font_scale(800, 600), 1.0);
    assert_eq!(s.font_scale(1600, 600), 1.0);
    assert_eq!(s.font_scale(1920, 1080), 1.8);
}

#[test]
fn thickness_scales_with_font() {
    let s = CaptionStyle::default();
    assert_eq!(s.line_thickness(0.8), 1);
    assert_eq!(s.line_thickness(1.0), 2);
    assert_eq!(s.line_thickness(1.8), 3);
    assert_eq!(s.font_px(1.0), 28.0);
}

#[test]
fn wrap_width_has_a_floor() {
    let s = CaptionStyle::default();
    assert_eq!(s.max_chars_per_line(320), 30);
    assert_eq!(s.max_chars_per_line(1920), 96);
}

#[test]
fn wrap_packs_greedily() {
    let lines = wrap_words("the quick brown fox jumps over the lazy dog", 10);
    assert_eq!(
        lines,
        vec!["the quick", "brown fox", "jumps over", "the lazy", "dog"]
    );
}

#[test]
fn wrap_never_splits_words_and_respects_limit() {
    let text = "a bb ccc supercalifragilisticexpialidocious dd e fffffff gg";
    let max = 8;
    let lines = wrap_words(text, max);

    let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.split(' ')).collect();
    let original: Vec<&str> = text.split_whitespace().collect();
    assert_eq!(rejoined, original);

    for line in &lines {
        let n = line.chars().count();
        assert!(n <= max || !line.contains(' '), "line {line:?} too long");
    }
    assert!(lines.contains(&"supercalifragilisticexpialidocious".to_string()));
}

#[test]
fn wrap_collapses_whitespace_and_counts_chars_not_bytes() {
    assert!(wrap_words("   \t\n ", 30).is_empty());
    assert_eq!(wrap_words("  hi \n there ", 30), vec!["hi there"]);
    assert_eq!(wrap_words("ééé ééé", 7), vec!["ééé ééé"]);
}

#[test]
fn panel_is_centered_and_above_bottom_margin() {
    let s = CaptionStyle::default();
    let lines = [
        LineSize {
            width: 100,
            height: 30,
        },
        LineSize {
            width: 60,
            height: 30,
        },
    ];
    let layout = layout_panel(&s, 400, 300, &lines);

    // 100 + 2*10 wide, 30 + 5 + 30 + 2*10 tall.
    assert_eq!(
        layout.panel,
        PixelRect {
            x: 140,
            y: 195,
            width: 120,
            height: 85
        }
    );
    assert_eq!(layout.line_origins, vec![(150, 205), (170, 240)]);
}

#[test]
fn panel_is_clamped_into_small_frames() {
    let s = CaptionStyle::default();
    let lines = [LineSize {
        width: 200,
        height: 40,
    }];
    let layout = layout_panel(&s, 100, 50, &lines);
    assert_eq!(layout.panel.x, 0);
    assert_eq!(layout.panel.y, 0);
    assert_eq!(layout.panel.width, 100);
    assert_eq!(layout.panel.height, 50);
    assert!(!layout.panel.is_empty());
}

#[test]
fn rect_contains_is_half_open() {
    let r = PixelRect {
        x: 2,
        y: 3,
        width: 4,
        height: 5,
    };
    assert!(r.contains(2, 3));
    assert!(r.contains(5, 7));
    assert!(!r.contains(6, 7));
    assert!(!r.contains(5, 8));
    assert!(!r.contains(1, 3));
}
