use std::{fs::File, io, path::Path};

use crate::{
    error::Error,
    types::record::{Field, Record},
};

/// Receives output records in their final order.
pub trait Sink {
    fn emit(&mut self, record: Record) -> Result<(), Error>;
}

impl Sink for Vec<Record> {
    fn emit(&mut self, record: Record) -> Result<(), Error> {
        self.push(record);
        Ok(())
    }
}

/// Writes records as CSV rows as soon as they are emitted.
pub struct CsvSink<W: io::Write> {
    writer: csv::Writer<W>,
}

impl<W: io::Write> CsvSink<W> {
    pub fn new(inner: W, delimiter: u8) -> Result<Self, Error> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(inner);
        writer.write_record(Field::headers())?;
        Ok(CsvSink { writer })
    }

    pub fn finish(mut self) -> Result<W, Error> {
        self.writer.flush()?;
        self.writer
            .into_inner()
            .map_err(|err| Error::Io(err.into_error()))
    }
}

impl CsvSink<File> {
    pub fn create<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self, Error> {
        CsvSink::new(File::create(path)?, delimiter)
    }
}

impl<W: io::Write> Sink for CsvSink<W> {
    fn emit(&mut self, record: Record) -> Result<(), Error> {
        self.writer.write_record(record.values())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::{RecordBuilder, RecordType};

    #[test]
    fn test_csv_sink_writes_header_and_rows() {
        let mut sink = CsvSink::new(Vec::new(), b';').unwrap();
        sink.emit(
            RecordBuilder::new(RecordType::Deposit)
                .buy("1.5", "BTC")
                .field(Field::Exchange, "Binance")
                .build(),
        )
        .unwrap();

        let written = String::from_utf8(sink.finish().unwrap()).unwrap();
        let lines: Vec<&str> = written.lines().collect();

        assert_eq!(
            lines[0],
            "Tipo;Operacion;Compra;MonedaC;Venta;MonedaV;Comision;MonedaF;Exchange;Grupo;Comentario;Fecha"
        );
        assert_eq!(lines[1], "Deposit;;1.5;BTC;;;;;Binance;;;");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_vec_sink_keeps_order() {
        let mut sink: Vec<Record> = Vec::new();
        let first = RecordBuilder::new(RecordType::Deposit).buy("1", "BTC").build();
        let second = RecordBuilder::new(RecordType::Deposit).buy("2", "BTC").build();

        sink.emit(first.clone()).unwrap();
        sink.emit(second.clone()).unwrap();
        assert_eq!(sink, vec![first, second]);
    }
}
