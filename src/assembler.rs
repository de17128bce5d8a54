use crate::types::{FieldValues, Record};

/// Merge the two partial extractions into a full record. Promoter-tab values
/// take precedence when both regions resolved the same key; missing keys are
/// left empty.
pub fn assemble(overview: FieldValues, promoter: FieldValues) -> Record {
    let mut record = Record::empty();
    for (field, value) in overview.into_iter().chain(promoter) {
        record.set(field, value);
    }
    record
}
