//! Text emission of generated tables as C array declarations.
//!
//! The output layout is fixed: identical configuration must always produce byte-identical text
//! so the tables can be regenerated and compared against the copy compiled into the codec.
use std::io::{self, Write};

use crate::bitrate::BitRateTable;
use crate::layout::{ByteOffsetTable, ShiftTable, NUM_PHASES};
use crate::permute::PermutationTable;

fn join<T: ToString>(vals: &[T]) -> String {
    let list: Vec<String> = vals.iter().map(|v| v.to_string()).collect();
    list.join(", ")
}

fn render_cells<C: AsRef<[u8]>>(dst: &mut String, decl: &str, rows: std::slice::Chunks<C>) {
    dst.push_str(decl);
    dst.push_str("\n{\n");
    for row in rows {
        let cells: Vec<String> = row.iter().map(|cell| format!("{{ {} }}", join(cell.as_ref()))).collect();
        dst.push_str(&format!("\t{{ {} }},\n", cells.join(", ")));
    }
    dst.push_str("};\n");
}

/// Renders `shift_values[8][W + 1][3]`.
pub fn render_shift_table(table: &ShiftTable) -> String {
    let mut ret = String::new();
    let decl = format!("static constexpr uint8_t shift_values[{}][{}][3] =", NUM_PHASES, table.num_widths());
    render_cells(&mut ret, &decl, table.rows());
    ret
}

/// Renders `byte_offset_values[8][W][2]`.
pub fn render_byte_offset_table(table: &ByteOffsetTable) -> String {
    let mut ret = String::new();
    let decl = format!("static constexpr uint8_t byte_offset_values[{}][{}][2] =", NUM_PHASES, table.num_widths());
    if table.num_widths() == 0 {
        ret.push_str(&decl);
        ret.push_str("\n{\n");
        for _ in 0..NUM_PHASES {
            ret.push_str("\t{  },\n");
        }
        ret.push_str("};\n");
        return ret;
    }
    render_cells(&mut ret, &decl, table.rows());
    ret
}

/// Renders one permutation table with a size comment on every row.
pub fn render_permutations(table: &PermutationTable) -> String {
    let mut ret = format!("constexpr uint8_t {}[{}][{}] =\n{{\n", table.dof().table_name(), table.len(), table.dof().count());
    for entry in table.entries() {
        ret.push_str(&format!("\t{{ {} }},\t\t// {} bits per transform\n", join(entry.rates()), entry.total_bits));
    }
    ret.push_str("};\n");
    ret
}

/// Renders several permutation tables separated by empty lines.
pub fn render_permutation_set(tables: &[PermutationTable]) -> String {
    let parts: Vec<String> = tables.iter().map(render_permutations).collect();
    parts.join("\n")
}

/// Renders a guard tying the tables to the bit rate table they were generated for.
///
/// The consuming code is expected to define `k_num_bit_rates`; a table built for another bit rate table then fails to compile.
pub fn render_version_guard(bit_rates: &BitRateTable) -> String {
    format!("// Generated for bit rate table {}\nstatic_assert(k_num_bit_rates == {}, \"Bit rate table mismatch, regenerate the packed layout tables\");\n",
            bit_rates, bit_rates.num_bit_rates())
}

/// Writes `shift_values` to the output.
pub fn write_shift_table<W: Write>(out: &mut W, table: &ShiftTable) -> io::Result<()> {
    out.write_all(render_shift_table(table).as_bytes())
}

/// Writes `byte_offset_values` to the output.
pub fn write_byte_offset_table<W: Write>(out: &mut W, table: &ByteOffsetTable) -> io::Result<()> {
    out.write_all(render_byte_offset_table(table).as_bytes())
}

/// Writes permutation tables to the output.
pub fn write_permutations<W: Write>(out: &mut W, tables: &[PermutationTable]) -> io::Result<()> {
    out.write_all(render_permutation_set(tables).as_bytes())
}

/// Writes the bit rate table guard to the output.
pub fn write_version_guard<W: Write>(out: &mut W, bit_rates: &BitRateTable) -> io::Result<()> {
    out.write_all(render_version_guard(bit_rates).as_bytes())
}

/// Finds the first line where two renderings differ.
///
/// Returns the 1-based line number with both lines (empty when one text is shorter).
pub fn first_difference(expected: &str, actual: &str) -> Option<(usize, String, String)> {
    let mut exp = expected.lines();
    let mut act = actual.lines();
    let mut lineno = 0;
    loop {
        lineno += 1;
        match (exp.next(), act.next()) {
            (None, None) => return None,
            (e, a) if e == a => {},
            (e, a) => return Some((lineno, e.unwrap_or("").to_owned(), a.unwrap_or("").to_owned())),
        }
    }
}
