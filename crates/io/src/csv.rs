// Register import: decode, sniff, parse into a RawTable

use std::io::Read;
use std::path::Path;

use ipo_engine::RawTable;

/// Load a register file into a [`RawTable`]. Decoding and delimiter
/// detection are automatic; the first row becomes the header row.
pub fn import(path: &Path) -> Result<RawTable, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter)
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: (number of lines with same field count as line 1) * field_count
        // Higher field count breaks ties — more columns = more likely real delimiter
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    let content = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    // Excel prepends a BOM that would otherwise stick to the first header
    Ok(content.strip_prefix('\u{feff}').unwrap_or(&content).to_string())
}

fn import_from_string(content: &str, delimiter: u8) -> Result<RawTable, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut headers: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| e.to_string())?;
        let fields: Vec<String> = record.iter().map(|f| f.trim().to_string()).collect();
        if row_idx == 0 {
            headers = fields;
        } else {
            let mut row = fields;
            // Ragged exports are common; pad short rows so column indexes
            // stay valid and drop stray cells past the header width
            row.resize(headers.len(), String::new());
            rows.push(row);
        }
    }

    if headers.is_empty() {
        return Err("file has no header row".to_string());
    }

    Ok(RawTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "Código;Qtde;Receita\n101;3;29,70\n102;1;9,90\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_comma_delimiter() {
        let content = "Codigo,Qtde,Receita\n101,3,29.70\n102,1,9.90\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "Código\tQtde\tReceita\n101\t3\t29,70\n102\t1\t9,90\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_semicolon_with_commas_in_values() {
        // Semicolon delimiter but commas appear inside quoted fields
        let content = "Código;Descrição;Receita\n101;\"Atlas, ed. rev.\";\"1.234,56\"\n102;Guia;9,90\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_import_semicolon_register() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vendas.csv");
        fs::write(&path, "Código;Qtde;Preço Médio\n101;3;9,90\n102;1;29,70\n").unwrap();

        let table = import(&path).unwrap();
        assert_eq!(table.headers, vec!["Código", "Qtde", "Preço Médio"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["101", "3", "9,90"]);
    }

    #[test]
    fn test_import_strips_bom() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vendas.csv");
        fs::write(&path, "\u{feff}Código;Qtde\n101;3\n").unwrap();

        let table = import(&path).unwrap();
        assert_eq!(table.headers[0], "Código");
    }

    #[test]
    fn test_import_windows_1252_register() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vendas.csv");
        // "Código;Descrição" in Windows-1252 (0xF3 = ó, 0xE7 = ç, 0xE3 = ã)
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"C\xF3digo;Descri\xE7\xE3o\n101;Atlas\n");
        fs::write(&path, bytes).unwrap();

        let table = import(&path).unwrap();
        assert_eq!(table.headers, vec!["Código", "Descrição"]);
        assert_eq!(table.rows[0], vec!["101", "Atlas"]);
    }

    #[test]
    fn test_import_pads_ragged_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vendas.csv");
        fs::write(&path, "Código;Qtde;Receita\n101;3\n").unwrap();

        let table = import(&path).unwrap();
        assert_eq!(table.rows[0].len(), 3);
        assert_eq!(table.rows[0][2], "");
    }

    #[test]
    fn test_import_truncates_long_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vendas.csv");
        fs::write(&path, "Código;Qtde\n101;3;extra;cells\n").unwrap();

        let table = import(&path).unwrap();
        assert_eq!(table.rows[0], vec!["101", "3"]);
    }

    #[test]
    fn test_import_empty_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vazio.csv");
        fs::write(&path, "").unwrap();

        assert!(import(&path).is_err());
    }
}
