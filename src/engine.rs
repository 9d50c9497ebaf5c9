use std::collections::HashMap;

use crate::{
    config::Config,
    error::Error,
    grouping::{GroupKeys, block_key},
    merge::Dispatcher,
    sink::Sink,
    transform::RowTransformer,
    types::{
        common::{BlockKey, GroupKey, RawRow},
        record::{Field, Record},
    },
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub rows: usize,
    pub emitted: usize,
    pub groups: usize,
    pub dropped: usize,
}

/// Single-pass driver: transforms rows, buffers the groups of the current day
/// and merges them once a row from another day arrives.
///
/// Input must be ordered by day. Records that belong together but land in
/// different days are merged separately.
pub struct Engine {
    config: Config,
    transformer: RowTransformer,
    keys: GroupKeys,
    dispatcher: Dispatcher,
    current_block: Option<BlockKey>,
    // Groups in the order their key was first seen.
    open_groups: Vec<(GroupKey, Vec<Record>)>,
    group_index: HashMap<GroupKey, usize>,
    stats: Stats,
}

impl Engine {
    pub fn new(
        config: Config,
        transformer: RowTransformer,
        keys: GroupKeys,
        dispatcher: Dispatcher,
    ) -> Self {
        Engine {
            config,
            transformer,
            keys,
            dispatcher,
            current_block: None,
            open_groups: Vec::new(),
            group_index: HashMap::new(),
            stats: Stats::default(),
        }
    }

    pub fn binance(config: Config) -> Result<Self, Error> {
        config.dates.validate()?;
        let transformer = RowTransformer::binance(&config)?;
        let keys = GroupKeys::binance(&config)?;
        Ok(Engine::new(config, transformer, keys, Dispatcher::binance()))
    }

    /// Feeds every row through the engine and flushes the last day.
    pub fn run<I, E, S>(mut self, rows: I, sink: &mut S) -> Result<Stats, Error>
    where
        I: IntoIterator<Item = Result<RawRow, E>>,
        Error: From<E>,
        S: Sink,
    {
        for row in rows {
            self.process_row(&row?, sink)?;
        }
        self.finish(sink)
    }

    pub fn process_row<S: Sink>(&mut self, row: &RawRow, sink: &mut S) -> Result<(), Error> {
        self.stats.rows += 1;
        let record = self.transformer.transform(row)?;
        self.process_record(record, sink)
    }

    pub fn process_record<S: Sink>(&mut self, record: Record, sink: &mut S) -> Result<(), Error> {
        if !self.config.merge {
            return self.emit(record, sink);
        }

        let block = block_key(&record, &self.config.dates)?;
        if self
            .current_block
            .as_ref()
            .is_some_and(|current| *current != block)
        {
            self.flush(sink)?;
        }
        self.current_block = Some(block);

        let Some(key) = self.keys.key(&record)? else {
            log::warn!(
                "No group key for {} record at {}, dropping it",
                record.kind(),
                record.get(Field::Timestamp)
            );
            self.stats.dropped += 1;
            return Ok(());
        };

        match self.group_index.get(&key).copied() {
            Some(index) => self.open_groups[index].1.push(record),
            None => {
                self.group_index.insert(key.clone(), self.open_groups.len());
                self.open_groups.push((key, vec![record]));
            }
        }
        Ok(())
    }

    /// Merges the last open day. Consuming the engine keeps this to one call.
    pub fn finish<S: Sink>(mut self, sink: &mut S) -> Result<Stats, Error> {
        self.flush(sink)?;
        log::info!(
            "Processed {} rows: {} records written, {} groups merged, {} dropped",
            self.stats.rows,
            self.stats.emitted,
            self.stats.groups,
            self.stats.dropped
        );
        Ok(self.stats)
    }

    fn flush<S: Sink>(&mut self, sink: &mut S) -> Result<(), Error> {
        if let Some(block) = &self.current_block {
            log::debug!("Closing {} with {} groups", block, self.open_groups.len());
        }

        self.group_index.clear();
        for (key, group) in std::mem::take(&mut self.open_groups) {
            self.stats.groups += 1;
            for record in self.dispatcher.merge(&key, group)? {
                self.emit(record, sink)?;
            }
        }
        Ok(())
    }

    fn emit<S: Sink>(&mut self, record: Record, sink: &mut S) -> Result<(), Error> {
        self.stats.emitted += 1;
        sink.emit(record)
    }
}
