use itertools::Itertools;
use serde::Serialize;
use std::fmt;
use termion::style::{Underline, Reset};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{Result, models::Group};

/// Format a list of groups for display in a table.
pub fn format_groups(groups: &[Group]) -> String {
    groups.iter()
        .map(|group| format!("{} ({})", group.name(), group.id()))
        .join(" → ")
}

/// Print a value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_table<H, T, R>(header: H, rows: T)
where
    H: TableRow,
    T: AsRef<[R]>,
    R: TableRow<Size = H::Size>,
{
    let mut widths = (0..H::size())
        .map(|inx| UnicodeWidthStr::width(header.column(inx)))
        .collect::<Vec<_>>();

    for row in rows.as_ref() {
        for (inx, width) in widths.iter_mut().enumerate() {
            *width = (*width).max(UnicodeWidthStr::width(row.column(inx)));
        }
    }

    // Sum of all longest widths and spaces separating them.
    let total_width = widths.iter().sum::<usize>() + widths.len() - 1;

    let (terminal_width, _) = termion::terminal_size().unwrap_or((80, 20));
    let terminal_width = usize::from(terminal_width);

    // Only the last column is ever shortened; if that's not enough the table
    // is left to wrap.
    if total_width > terminal_width {
        let overflow = total_width - terminal_width;

        if let Some(last) = widths.last_mut() {
            *last = last.saturating_sub(overflow).max(1);
        }
    }

    for (inx, width) in widths.iter().enumerate() {
        if inx > 0 {
            print!(" ");
        }
        print!("{}{}{}",
            Underline, Column(header.column(inx), *width), Reset);
    }
    println!();

    for row in rows.as_ref() {
        for (inx, width) in widths.iter().enumerate() {
            if inx > 0 {
                print!(" ");
            }
            print!("{}", Column(row.column(inx), *width));
        }
        println!();
    }
}

pub trait TableRow {
    type Size;

    fn size() -> usize;

    fn column(&self, index: usize) -> &str;
}

macro_rules! impl_table_row {
    {
        $(
            $sizeconst:literal $size:ident => $($inx:tt : $ty:ident),+
        );+
        $(;)*
    } => {
        $(
            pub struct $size;

            impl<$($ty),+> TableRow for ($($ty,)+)
            where
                $($ty: AsRef<str>),+
            {
                type Size = $size;

                fn size() -> usize { $sizeconst }

                fn column(&self, index: usize) -> &str {
                    match index {
                        $($inx => self.$inx.as_ref(),)+
                        _ => "",
                    }
                }
            }
        )+
    };
}

impl_table_row! {
    2 Two   => 0: A, 1: B;
    3 Three => 0: A, 1: B, 2: C;
    4 Four  => 0: A, 1: B, 2: C, 3: D;
    5 Five  => 0: A, 1: B, 2: C, 3: D, 4: E;
}

/// A single table cell, truncated or padded to a display width.
struct Column<'a>(&'a str, usize);

impl<'a> fmt::Display for Column<'a> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let (len, end) = self.0.char_indices()
            .scan(0, |total_len, (inx, chr)| {
                *total_len += UnicodeWidthChar::width(chr).unwrap_or(0);
                if *total_len > self.1 {
                    None
                } else {
                    Some((*total_len, inx + chr.len_utf8()))
                }
            })
            .last()
            .unwrap_or((0, 0));

        write!(fmt, "{0}{1:2$}", &self.0[..end], "", self.1.saturating_sub(len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_pads_and_truncates() {
        assert_eq!(Column("abc", 5).to_string(), "abc  ");
        assert_eq!(Column("abcdef", 3).to_string(), "abc");
        assert_eq!(Column("żółw", 4).to_string(), "żółw");
    }
}
