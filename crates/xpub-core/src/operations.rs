//! Classification of an address's transactions into operations.

use std::collections::HashSet;

use crate::own_addresses::{OwnAddresses, INTERNAL_ACCOUNT};
use crate::record::{AddressRecord, Operation, OperationKind, Transaction};

fn operation(kind: OperationKind, tx: &Transaction, address: &str, amount: u128) -> Operation {
    Operation {
        kind,
        txid: tx.txid.clone(),
        time: tx.time,
        block_height: tx.block_height,
        address: address.to_string(),
        amount,
    }
}

/// Operations funding `address`.
///
/// Change addresses only report funds coming from transactions that spend
/// none of the key's own outputs; anything else is change from our own spend.
pub fn funded_operations(
    address: &str,
    internal: bool,
    transactions: &[Transaction],
    own: &OwnAddresses,
) -> Vec<Operation> {
    let mut ops = Vec::new();
    for tx in transactions {
        if internal && tx.ins.iter().any(|txin| own.contains(&txin.address)) {
            continue;
        }
        let kind = if internal {
            OperationKind::InChange
        } else {
            OperationKind::In
        };
        for out in tx.outs.iter().filter(|out| out.address == address) {
            ops.push(operation(kind, tx, address, out.value));
        }
    }
    ops
}

/// Operations spending from `address`, one per output not paying change.
pub fn sent_operations(
    address: &str,
    transactions: &[Transaction],
    own: &OwnAddresses,
) -> Vec<Operation> {
    let mut ops = Vec::new();
    for tx in transactions {
        if !tx.ins.iter().any(|txin| txin.address == address) {
            continue;
        }
        for out in &tx.outs {
            if own.is_internal(&out.address) {
                continue;
            }
            let kind = if out.address == address {
                OperationKind::OutSelf
            } else if own.is_external(&out.address) {
                OperationKind::OutSibling
            } else {
                OperationKind::Out
            };
            ops.push(operation(kind, tx, address, out.value));
        }
    }
    ops
}

/// Fill a record's funded and sent operations from its transactions.
pub fn classify(record: &mut AddressRecord, own: &OwnAddresses) {
    let internal = record.account == INTERNAL_ACCOUNT;
    record.funded_ops = funded_operations(&record.address, internal, &record.transactions, own);
    record.sent_ops = sent_operations(&record.address, &record.transactions, own);
}

/// All operations of all records, newest first.
///
/// Each txid contributes at most one sent operation: the first one seen,
/// in record order.
pub fn sorted_operations(records: &[AddressRecord]) -> Vec<Operation> {
    let mut operations = Vec::new();
    let mut seen_txids: HashSet<&str> = HashSet::new();

    for record in records {
        operations.extend(record.funded_ops.iter().cloned());
        for op in &record.sent_ops {
            if seen_txids.insert(op.txid.as_str()) {
                operations.push(op.clone());
            }
        }
    }

    operations.sort_by(|a, b| b.time.cmp(&a.time));
    operations
}
