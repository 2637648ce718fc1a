//! 长度单位换算
//!
//! 以96dpi为基准把CSS长度换算为像素，再按根元素的 `viewBox` 换算为用户单位。

use std::str::FromStr;
use svgtypes::{Length, LengthUnit, ViewBox};

/// 解析CSS长度并换算为像素
///
/// 支持 `px`、`pt`、`pc`、`mm`、`cm`、`in` 与无单位数值，百分比、`em` 等无法确定的单位返回 `None`。
pub fn parse_length(value: &str) -> Option<f64> {
    let length = Length::from_str(value.trim()).ok()?;

    let factor = match length.unit {
        LengthUnit::None | LengthUnit::Px => 1.0,
        LengthUnit::Pt => 96.0 / 72.0,
        LengthUnit::Pc => 16.0,
        LengthUnit::Mm => 96.0 / 25.4,
        LengthUnit::Cm => 96.0 / 2.54,
        LengthUnit::In => 96.0,
        _ => return None,
    };

    Some(length.number * factor)
}

/// 解析 `viewBox` 属性为 (min-x, min-y, width, height)
pub fn parse_view_box(value: &str) -> Option<(f64, f64, f64, f64)> {
    let view_box = ViewBox::from_str(value.trim()).ok()?;
    if view_box.w > 0.0 && view_box.h > 0.0 {
        Some((view_box.x, view_box.y, view_box.w, view_box.h))
    } else {
        None
    }
}

/// 把长度换算为用户单位
///
/// `scale` 为每像素对应的用户单位数，即 `viewBox.width / width_px`。
pub fn unittouu(value: &str, scale: f64) -> Option<f64> {
    parse_length(value).map(|px| px * scale)
}

/// 按模板需要的格式输出数字
///
/// 整数保留一位小数（`210.0`），其余使用最短的往返表示。
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
