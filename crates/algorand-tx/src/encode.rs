//! Canonical transaction encoding and decoding.
//!
//! Mirrors of each other: the encoder walks a transaction field by field,
//! appending only non-default values under their short wire labels, and
//! emits the map with keys in lexicographic byte order; the decoder
//! initializes every field to its default, reads the keys that are
//! present, and re-enters the validating constructor with `flat_fee`
//! (the wire form has the final fee baked in).
//!
//! Every rule here is consensus-critical: key labels, sorted order,
//! minimal-width integers, and which defaults are elided all feed the
//! transaction ID and therefore signature validity across clients.

use crate::params::*;
use crate::types::*;
use crate::TxError;
use algorand_crypto::msgpack::{self, Value};
use algorand_types::constants::{GROUP_ID_SIZE, KEY_SIZE, SIGNATURE_SIZE};
use algorand_types::Address;

// ─── Map Builder ─────────────────────────────────────────────────────────────

/// Collects key/value entries with values already msgpack-encoded, then
/// emits the canonical map. Entries are sorted by key at finish, so
/// emission sites stay simple and the canonical order is enforced in one
/// place.
struct MapBuilder {
    entries: Vec<(&'static str, Vec<u8>)>,
}

impl MapBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn raw(&mut self, key: &'static str, value: Vec<u8>) {
        self.entries.push((key, value));
    }

    fn uint(&mut self, key: &'static str, value: u64) {
        if value != 0 {
            let mut buf = Vec::new();
            msgpack::write_uint(&mut buf, value);
            self.raw(key, buf);
        }
    }

    fn flag(&mut self, key: &'static str, value: bool) {
        if value {
            let mut buf = Vec::new();
            msgpack::write_bool(&mut buf, value);
            self.raw(key, buf);
        }
    }

    fn str(&mut self, key: &'static str, value: &str) {
        if !value.is_empty() {
            let mut buf = Vec::new();
            msgpack::write_str(&mut buf, value);
            self.raw(key, buf);
        }
    }

    fn bytes(&mut self, key: &'static str, value: &[u8]) {
        if !value.is_empty() {
            self.bytes_always(key, value);
        }
    }

    fn bytes_always(&mut self, key: &'static str, value: &[u8]) {
        let mut buf = Vec::new();
        msgpack::write_bin(&mut buf, value);
        self.raw(key, buf);
    }

    /// Required address slot: emitted even for the zero address.
    fn address(&mut self, key: &'static str, address: &Address) {
        self.bytes_always(key, address.as_bytes());
    }

    fn opt_address(&mut self, key: &'static str, address: Option<&Address>) {
        if let Some(address) = address {
            self.bytes_always(key, address.as_bytes());
        }
    }

    fn opt_bytes(&mut self, key: &'static str, value: Option<&[u8]>) {
        if let Some(value) = value {
            self.bytes_always(key, value);
        }
    }

    fn finish(self) -> Vec<u8> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| a.0.cmp(b.0));
        let mut buf = Vec::new();
        msgpack::write_map_len(&mut buf, entries.len());
        for (key, value) in entries {
            msgpack::write_str(&mut buf, key);
            buf.extend_from_slice(&value);
        }
        buf
    }
}

fn encode_bin_array(items: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = Vec::new();
    msgpack::write_array_len(&mut buf, items.len());
    for item in items {
        msgpack::write_bin(&mut buf, item);
    }
    buf
}

fn encode_uint_array(items: &[u64]) -> Vec<u8> {
    let mut buf = Vec::new();
    msgpack::write_array_len(&mut buf, items.len());
    for &item in items {
        msgpack::write_uint(&mut buf, item);
    }
    buf
}

fn encode_address_array(items: &[Address]) -> Vec<u8> {
    let mut buf = Vec::new();
    msgpack::write_array_len(&mut buf, items.len());
    for item in items {
        msgpack::write_bin(&mut buf, item.as_bytes());
    }
    buf
}

// ─── Transaction Encoding ────────────────────────────────────────────────────

/// Canonical msgpack encoding of a transaction.
pub fn encode_transaction(txn: &Transaction) -> Vec<u8> {
    let mut m = MapBuilder::new();

    m.uint("fee", txn.fee);
    m.uint("fv", txn.first_valid);
    m.uint("lv", txn.last_valid);
    m.str("gen", &txn.genesis_id);
    m.bytes_always("gh", &txn.genesis_hash);
    m.bytes("note", &txn.note);
    m.opt_bytes("lx", txn.lease.as_ref().map(|v| v.as_slice()));
    m.opt_bytes("grp", txn.group.as_ref().map(|v| v.as_slice()));
    m.opt_address("rekey", txn.rekey_to.as_ref());
    m.address("snd", &txn.sender);
    m.str("type", txn.tx_type().as_str());

    match &txn.payload {
        TxPayload::Payment(f) => append_payment(&mut m, f),
        TxPayload::KeyRegistration(f) => append_key_registration(&mut m, f),
        TxPayload::AssetConfig(f) => append_asset_config(&mut m, f),
        TxPayload::AssetTransfer(f) => append_asset_transfer(&mut m, f),
        TxPayload::AssetFreeze(f) => append_asset_freeze(&mut m, f),
        TxPayload::ApplicationCall(f) => append_application_call(&mut m, f),
        TxPayload::StateProof(f) => append_state_proof(&mut m, f),
    }

    m.finish()
}

fn append_payment(m: &mut MapBuilder, f: &PaymentFields) {
    m.uint("amt", f.amount);
    m.opt_address("close", f.close_remainder_to.as_ref());
    m.address("rcv", &f.receiver);
}

fn append_key_registration(m: &mut MapBuilder, f: &KeyRegistrationFields) {
    m.opt_bytes("votekey", f.vote_key.as_ref().map(|v| v.as_slice()));
    m.opt_bytes("selkey", f.selection_key.as_ref().map(|v| v.as_slice()));
    m.opt_bytes("sprfkey", f.state_proof_key.as_ref().map(|v| v.as_slice()));
    m.uint("votefst", f.vote_first.unwrap_or(0));
    m.uint("votelst", f.vote_last.unwrap_or(0));
    m.uint("votekd", f.vote_key_dilution.unwrap_or(0));
    m.flag("nonpart", f.non_participation);
}

fn append_asset_config(m: &mut MapBuilder, f: &AssetConfigFields) {
    m.uint("caid", f.asset_id);
    if !f.params.is_empty() {
        let mut sub = MapBuilder::new();
        sub.uint("t", f.params.total);
        sub.uint("dc", f.params.decimals as u64);
        sub.flag("df", f.params.default_frozen);
        sub.str("un", &f.params.unit_name);
        sub.str("an", &f.params.asset_name);
        sub.str("au", &f.params.url);
        sub.opt_bytes("am", f.params.metadata_hash.as_ref().map(|v| v.as_slice()));
        sub.opt_address("m", f.params.manager.as_ref());
        sub.opt_address("r", f.params.reserve.as_ref());
        sub.opt_address("f", f.params.freeze.as_ref());
        sub.opt_address("c", f.params.clawback.as_ref());
        m.raw("apar", sub.finish());
    }
}

fn append_asset_transfer(m: &mut MapBuilder, f: &AssetTransferFields) {
    m.uint("xaid", f.asset_id);
    m.uint("aamt", f.amount);
    m.opt_address("asnd", f.asset_sender.as_ref());
    m.address("arcv", &f.receiver);
    m.opt_address("aclose", f.close_remainder_to.as_ref());
}

fn append_asset_freeze(m: &mut MapBuilder, f: &AssetFreezeFields) {
    m.uint("faid", f.asset_id);
    m.address("fadd", &f.freeze_account);
    m.flag("afrz", f.frozen);
}

fn append_application_call(m: &mut MapBuilder, f: &ApplicationCallFields) {
    m.uint("apid", f.app_id);
    m.uint("apan", f.on_complete as u64);
    m.bytes("apap", &f.approval_program);
    m.bytes("apsu", &f.clear_program);
    if !f.app_args.is_empty() {
        m.raw("apaa", encode_bin_array(&f.app_args));
    }
    if !f.accounts.is_empty() {
        m.raw("apat", encode_address_array(&f.accounts));
    }
    if !f.foreign_apps.is_empty() {
        m.raw("apfa", encode_uint_array(&f.foreign_apps));
    }
    if !f.foreign_assets.is_empty() {
        m.raw("apas", encode_uint_array(&f.foreign_assets));
    }
    if !f.boxes.is_empty() {
        m.raw("apbx", encode_boxes(f));
    }
    if !f.local_schema.is_empty() {
        m.raw("apls", encode_schema(&f.local_schema));
    }
    if !f.global_schema.is_empty() {
        m.raw("apgs", encode_schema(&f.global_schema));
    }
    m.uint("apep", f.extra_pages as u64);
}

/// State proofs keep `sp` and `spmsg` present even when empty; the
/// original encoder never elides them and other clients hash that shape.
fn append_state_proof(m: &mut MapBuilder, f: &StateProofFields) {
    m.uint("sptype", f.state_proof_type as u64);
    m.bytes_always("sp", &f.state_proof);
    m.bytes_always("spmsg", &f.message);
}

/// Rewrite box references to wire form: `i` is 0 for the called app
/// (whether given as 0 or as the call's own app ID), otherwise the
/// 1-based index of the referenced ID within the foreign apps array.
fn encode_boxes(f: &ApplicationCallFields) -> Vec<u8> {
    let mut buf = Vec::new();
    msgpack::write_array_len(&mut buf, f.boxes.len());
    for b in &f.boxes {
        let index = if b.app_index == 0 || b.app_index == f.app_id {
            0
        } else {
            // Membership is enforced at construction.
            f.foreign_apps
                .iter()
                .position(|&id| id == b.app_index)
                .map(|p| p as u64 + 1)
                .unwrap_or(0)
        };
        let mut bm = MapBuilder::new();
        bm.uint("i", index);
        bm.bytes("n", &b.name);
        buf.extend_from_slice(&bm.finish());
    }
    buf
}

fn encode_schema(schema: &StateSchema) -> Vec<u8> {
    let mut sub = MapBuilder::new();
    sub.uint("nui", schema.num_uints as u64);
    sub.uint("nbs", schema.num_byte_slices as u64);
    sub.finish()
}

// ─── Envelope Encoding ───────────────────────────────────────────────────────

/// Canonical encoding of the signed-transaction envelope.
pub fn encode_signed_transaction(st: &SignedTransaction) -> Vec<u8> {
    let mut m = MapBuilder::new();
    if let Some(lsig) = &st.lsig {
        m.raw("lsig", encode_logic_signature(lsig));
    }
    if let Some(msig) = &st.msig {
        m.raw("msig", encode_multisig(msig));
    }
    m.opt_address("sgnr", st.auth_address.as_ref());
    m.opt_bytes("sig", st.sig.as_ref().map(|v| v.as_slice()));
    m.raw("txn", encode_transaction(&st.txn));
    m.finish()
}

/// Canonical encoding of a multisig record.
pub fn encode_multisig(msig: &MultisigSignature) -> Vec<u8> {
    let mut m = MapBuilder::new();
    let mut subsigs = Vec::new();
    msgpack::write_array_len(&mut subsigs, msig.subsigs.len());
    for subsig in &msig.subsigs {
        let mut sm = MapBuilder::new();
        sm.bytes("pk", &subsig.public_key);
        sm.opt_bytes("s", subsig.signature.as_ref().map(|v| v.as_slice()));
        subsigs.extend_from_slice(&sm.finish());
    }
    m.raw("subsig", subsigs);
    m.uint("thr", msig.threshold as u64);
    m.uint("v", msig.version as u64);
    m.finish()
}

fn encode_logic_signature(lsig: &LogicSignature) -> Vec<u8> {
    let mut m = MapBuilder::new();
    m.bytes("l", &lsig.logic);
    if !lsig.args.is_empty() {
        m.raw("arg", encode_bin_array(&lsig.args));
    }
    m.opt_bytes("sig", lsig.sig.as_ref().map(|v| v.as_slice()));
    if let Some(msig) = &lsig.msig {
        m.raw("msig", encode_multisig(msig));
    }
    m.finish()
}

impl SignedTransaction {
    /// Encode the signed envelope.
    pub fn encode(&self) -> Vec<u8> {
        encode_signed_transaction(self)
    }

    /// Decode a signed envelope.
    pub fn decode(data: &[u8]) -> Result<SignedTransaction, TxError> {
        decode_signed_transaction(data)
    }
}

// ─── Decode Helpers ──────────────────────────────────────────────────────────

fn get_u64(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn get_u32(value: &Value, key: &str, field: &'static str) -> Result<u32, TxError> {
    let raw = get_u64(value, key);
    u32::try_from(raw).map_err(|_| TxError::CountOverflow { field, value: raw })
}

fn get_u8(value: &Value, key: &str, field: &'static str) -> Result<u8, TxError> {
    let raw = get_u64(value, key);
    u8::try_from(raw).map_err(|_| TxError::CountOverflow { field, value: raw })
}

fn get_bool(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn get_str(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn opt_bytes(value: &Value, key: &str) -> Option<Vec<u8>> {
    value.get(key).and_then(Value::as_bytes).map(<[u8]>::to_vec)
}

fn get_bytes(value: &Value, key: &str) -> Vec<u8> {
    opt_bytes(value, key).unwrap_or_default()
}

fn fixed<const N: usize>(field: &'static str, bytes: &[u8]) -> Result<[u8; N], TxError> {
    bytes.try_into().map_err(|_| TxError::InvalidLength {
        field,
        expected: N,
        actual: bytes.len(),
    })
}

/// Read an address field as its textual form for re-entry through the
/// parameter record; absent keys stay absent.
fn opt_address_text(
    value: &Value,
    key: &str,
    field: &'static str,
) -> Result<Option<String>, TxError> {
    match opt_bytes(value, key) {
        None => Ok(None),
        Some(bytes) => {
            let address =
                Address::from_bytes(&bytes).map_err(|source| TxError::Address { field, source })?;
            Ok(Some(address.encode()))
        }
    }
}

/// Required address slot: absent decodes to the zero address.
fn address_text(value: &Value, key: &str, field: &'static str) -> Result<String, TxError> {
    Ok(opt_address_text(value, key, field)?.unwrap_or_else(|| Address::ZERO.encode()))
}

fn get_bin_array(value: &Value, key: &str, field: &'static str) -> Result<Vec<Vec<u8>>, TxError> {
    let Some(items) = value.get(key) else {
        return Ok(Vec::new());
    };
    let items = items
        .as_array()
        .ok_or_else(|| TxError::Decode(format!("{field} is not an array")))?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let bytes = item
            .as_bytes()
            .ok_or_else(|| TxError::Decode(format!("{field} element is not a byte string")))?;
        out.push(bytes.to_vec());
    }
    Ok(out)
}

fn get_uint_array(value: &Value, key: &str, field: &'static str) -> Result<Vec<u64>, TxError> {
    let Some(items) = value.get(key) else {
        return Ok(Vec::new());
    };
    let items = items
        .as_array()
        .ok_or_else(|| TxError::Decode(format!("{field} is not an array")))?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(
            item.as_u64()
                .ok_or_else(|| TxError::Decode(format!("{field} element is not an integer")))?,
        );
    }
    Ok(out)
}

// ─── Transaction Decoding ────────────────────────────────────────────────────

/// Decode a canonical transaction encoding back into a validated
/// [`Transaction`]. The wire fee is taken verbatim (`flat_fee`).
pub fn decode_transaction(data: &[u8]) -> Result<Transaction, TxError> {
    transaction_from_value(&msgpack::decode(data)?)
}

pub(crate) fn transaction_from_value(value: &Value) -> Result<Transaction, TxError> {
    if value.as_map().is_none() {
        return Err(TxError::Decode("transaction is not a map".to_string()));
    }

    let tx_type_label = get_str(value, "type");
    if tx_type_label.is_empty() {
        return Err(TxError::MissingField("type"));
    }
    let tx_type = TxType::parse(&tx_type_label)
        .ok_or_else(|| TxError::UnknownType(tx_type_label.clone()))?;

    let genesis_id = get_str(value, "gen");
    let suggested_params = SuggestedParams {
        fee: get_u64(value, "fee"),
        min_fee: 0,
        flat_fee: true,
        first_valid: get_u64(value, "fv"),
        last_valid: get_u64(value, "lv"),
        genesis_id: (!genesis_id.is_empty()).then_some(genesis_id),
        genesis_hash: get_bytes(value, "gh"),
    };

    let mut params = TxParams {
        tx_type: tx_type_label,
        sender: address_text(value, "snd", "sender")?,
        suggested_params,
        note: opt_bytes(value, "note"),
        lease: opt_bytes(value, "lx"),
        rekey_to: opt_address_text(value, "rekey", "rekeyTo")?,
        payment: None,
        key_registration: None,
        asset_config: None,
        asset_transfer: None,
        asset_freeze: None,
        application_call: None,
        state_proof: None,
    };

    match tx_type {
        TxType::Payment => {
            params.payment = Some(PaymentParams {
                receiver: address_text(value, "rcv", "receiver")?,
                amount: get_u64(value, "amt"),
                close_remainder_to: opt_address_text(value, "close", "closeRemainderTo")?,
            });
        }
        TxType::KeyRegistration => {
            // Absent and zero are the same wire form for the vote rounds,
            // so nonzero is the only readable notion of presence here;
            // construction applies the matching normalization.
            let vote_first = get_u64(value, "votefst");
            let vote_last = get_u64(value, "votelst");
            let vote_key_dilution = get_u64(value, "votekd");
            params.key_registration = Some(KeyRegistrationParams {
                vote_key: opt_bytes(value, "votekey"),
                selection_key: opt_bytes(value, "selkey"),
                state_proof_key: opt_bytes(value, "sprfkey"),
                vote_first: (vote_first != 0).then_some(vote_first),
                vote_last: (vote_last != 0).then_some(vote_last),
                vote_key_dilution: (vote_key_dilution != 0).then_some(vote_key_dilution),
                non_participation: get_bool(value, "nonpart"),
            });
        }
        TxType::AssetConfig => {
            let mut config = AssetConfigParams {
                asset_id: get_u64(value, "caid"),
                ..AssetConfigParams::default()
            };
            if let Some(apar) = value.get("apar") {
                config.total = get_u64(apar, "t");
                config.decimals = get_u32(apar, "dc", "decimals")?;
                config.default_frozen = get_bool(apar, "df");
                let unit_name = get_str(apar, "un");
                let asset_name = get_str(apar, "an");
                let url = get_str(apar, "au");
                config.unit_name = (!unit_name.is_empty()).then_some(unit_name);
                config.asset_name = (!asset_name.is_empty()).then_some(asset_name);
                config.url = (!url.is_empty()).then_some(url);
                config.metadata_hash = opt_bytes(apar, "am");
                config.manager = opt_address_text(apar, "m", "manager")?;
                config.reserve = opt_address_text(apar, "r", "reserve")?;
                config.freeze = opt_address_text(apar, "f", "freeze")?;
                config.clawback = opt_address_text(apar, "c", "clawback")?;
            }
            params.asset_config = Some(config);
        }
        TxType::AssetTransfer => {
            params.asset_transfer = Some(AssetTransferParams {
                asset_id: get_u64(value, "xaid"),
                amount: get_u64(value, "aamt"),
                asset_sender: opt_address_text(value, "asnd", "assetSender")?,
                receiver: address_text(value, "arcv", "receiver")?,
                close_remainder_to: opt_address_text(value, "aclose", "closeRemainderTo")?,
            });
        }
        TxType::AssetFreeze => {
            params.asset_freeze = Some(AssetFreezeParams {
                asset_id: get_u64(value, "faid"),
                freeze_account: address_text(value, "fadd", "freezeAccount")?,
                frozen: get_bool(value, "afrz"),
            });
        }
        TxType::ApplicationCall => {
            params.application_call = Some(application_call_from_value(value)?);
        }
        TxType::StateProof => {
            params.state_proof = Some(StateProofParams {
                state_proof_type: get_u32(value, "sptype", "stateProofType")?,
                state_proof: get_bytes(value, "sp"),
                message: get_bytes(value, "spmsg"),
            });
        }
    }

    let mut txn = Transaction::from_params(&params)?;

    if let Some(group) = opt_bytes(value, "grp") {
        txn.set_group(fixed::<GROUP_ID_SIZE>("group", &group)?)?;
    }

    Ok(txn)
}

fn application_call_from_value(value: &Value) -> Result<ApplicationCallParams, TxError> {
    let foreign_apps = get_uint_array(value, "apfa", "foreignApps")?;

    let mut accounts = Vec::new();
    for bytes in get_bin_array(value, "apat", "accounts")? {
        let address =
            Address::from_bytes(&bytes).map_err(|source| TxError::Address {
                field: "accounts",
                source,
            })?;
        accounts.push(address.encode());
    }

    let mut boxes = Vec::new();
    if let Some(items) = value.get("apbx") {
        let items = items
            .as_array()
            .ok_or_else(|| TxError::Decode("boxes is not an array".to_string()))?;
        for item in items {
            let index = get_u64(item, "i");
            // Index 0 decodes to app_index 0, never the called app's
            // numeric ID, so re-encoding reproduces the same bytes.
            let app_index = if index == 0 {
                0
            } else {
                *foreign_apps
                    .get(index as usize - 1)
                    .ok_or_else(|| TxError::Decode(format!("box index {index} out of range")))?
            };
            boxes.push(BoxReferenceParams {
                app_index,
                name: get_bytes(item, "n"),
            });
        }
    }

    let schema = |key: &str| -> Result<StateSchemaParams, TxError> {
        match value.get(key) {
            None => Ok(StateSchemaParams::default()),
            Some(sub) => Ok(StateSchemaParams {
                num_uints: get_u32(sub, "nui", "schemaNumUints")?,
                num_byte_slices: get_u32(sub, "nbs", "schemaNumByteSlices")?,
            }),
        }
    };

    Ok(ApplicationCallParams {
        app_id: get_u64(value, "apid"),
        on_complete: get_u32(value, "apan", "onComplete")?,
        approval_program: get_bytes(value, "apap"),
        clear_program: get_bytes(value, "apsu"),
        app_args: get_bin_array(value, "apaa", "appArgs")?,
        accounts,
        foreign_apps,
        foreign_assets: get_uint_array(value, "apas", "foreignAssets")?,
        boxes,
        local_schema: schema("apls")?,
        global_schema: schema("apgs")?,
        extra_pages: get_u32(value, "apep", "extraPages")?,
    })
}

// ─── Envelope Decoding ───────────────────────────────────────────────────────

/// Decode a signed-transaction envelope.
pub fn decode_signed_transaction(data: &[u8]) -> Result<SignedTransaction, TxError> {
    let value = msgpack::decode(data)?;
    if value.as_map().is_none() {
        return Err(TxError::Decode("signed transaction is not a map".to_string()));
    }

    let txn_value = value.get("txn").ok_or(TxError::MissingField("txn"))?;
    let txn = transaction_from_value(txn_value)?;

    let sig = match opt_bytes(&value, "sig") {
        None => None,
        Some(bytes) => Some(fixed::<SIGNATURE_SIZE>("sig", &bytes)?),
    };

    let msig = match value.get("msig") {
        None => None,
        Some(msig) => Some(multisig_from_value(msig)?),
    };

    let lsig = match value.get("lsig") {
        None => None,
        Some(lsig) => Some(logic_signature_from_value(lsig)?),
    };

    let auth_address = match opt_bytes(&value, "sgnr") {
        None => None,
        Some(bytes) => Some(
            Address::from_bytes(&bytes).map_err(|source| TxError::Address {
                field: "authAddress",
                source,
            })?,
        ),
    };

    Ok(SignedTransaction {
        txn,
        sig,
        msig,
        lsig,
        auth_address,
    })
}

/// Decode a multisig record.
pub fn multisig_from_value(value: &Value) -> Result<MultisigSignature, TxError> {
    let subsig_items = value
        .get("subsig")
        .and_then(Value::as_array)
        .ok_or(TxError::MissingField("subsig"))?;

    let mut subsigs = Vec::with_capacity(subsig_items.len());
    for item in subsig_items {
        let pk = opt_bytes(item, "pk").ok_or(TxError::MissingField("pk"))?;
        let signature = match opt_bytes(item, "s") {
            None => None,
            Some(bytes) => Some(fixed::<SIGNATURE_SIZE>("subsig signature", &bytes)?),
        };
        subsigs.push(MultisigSubsig {
            public_key: fixed::<KEY_SIZE>("subsig public key", &pk)?,
            signature,
        });
    }

    Ok(MultisigSignature {
        version: get_u8(value, "v", "multisig version")?,
        threshold: get_u8(value, "thr", "multisig threshold")?,
        subsigs,
    })
}

fn logic_signature_from_value(value: &Value) -> Result<LogicSignature, TxError> {
    let sig = match opt_bytes(value, "sig") {
        None => None,
        Some(bytes) => Some(fixed::<SIGNATURE_SIZE>("lsig sig", &bytes)?),
    };
    let msig = match value.get("msig") {
        None => None,
        Some(msig) => Some(multisig_from_value(msig)?),
    };
    Ok(LogicSignature {
        logic: get_bytes(value, "l"),
        args: get_bin_array(value, "arg", "lsig args")?,
        sig,
        msig,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pay_params() -> TxParams {
        TxParams {
            tx_type: "pay".to_string(),
            sender: Address::ZERO.encode(),
            suggested_params: SuggestedParams {
                fee: 1000,
                min_fee: 1000,
                flat_fee: true,
                first_valid: 1,
                last_valid: 1001,
                genesis_id: Some("testnet-v1.0".to_string()),
                genesis_hash: vec![0x01; 32],
            },
            note: None,
            lease: None,
            rekey_to: None,
            payment: Some(PaymentParams {
                receiver: Address::new([2u8; 32]).encode(),
                amount: 1000,
                close_remainder_to: None,
            }),
            key_registration: None,
            asset_config: None,
            asset_transfer: None,
            asset_freeze: None,
            application_call: None,
            state_proof: None,
        }
    }

    fn encoded_keys(data: &[u8]) -> Vec<String> {
        let value = msgpack::decode(data).unwrap();
        value
            .as_map()
            .unwrap()
            .iter()
            .map(|(k, _)| k.clone())
            .collect()
    }

    #[test]
    fn test_payment_key_order() {
        let txn = Transaction::from_params(&pay_params()).unwrap();
        let encoded = encode_transaction(&txn);
        assert_eq!(
            encoded_keys(&encoded),
            ["amt", "fee", "fv", "gen", "gh", "lv", "rcv", "snd", "type"]
        );
    }

    #[test]
    fn test_zero_sender_still_emitted() {
        let txn = Transaction::from_params(&pay_params()).unwrap();
        let value = msgpack::decode(&encode_transaction(&txn)).unwrap();
        assert_eq!(
            value.get("snd").and_then(Value::as_bytes),
            Some(&[0u8; 32][..])
        );
    }

    #[test]
    fn test_default_elision_stable() {
        // An explicit zero amount encodes identically to no amount at all.
        let mut with_zero = pay_params();
        with_zero.payment.as_mut().unwrap().amount = 0;
        let txn = Transaction::from_params(&with_zero).unwrap();
        let encoded = encode_transaction(&txn);
        assert!(!encoded_keys(&encoded).iter().any(|k| k == "amt"));
    }

    #[test]
    fn test_transaction_roundtrip() {
        let mut params = pay_params();
        params.note = Some(b"hello".to_vec());
        params.lease = Some(vec![0x0Fu8; 32]);
        let txn = Transaction::from_params(&params).unwrap();
        let decoded = decode_transaction(&encode_transaction(&txn)).unwrap();
        assert_eq!(decoded, txn);
    }

    #[test]
    fn test_group_roundtrip() {
        let mut txn = Transaction::from_params(&pay_params()).unwrap();
        txn.set_group([9u8; 32]).unwrap();
        let decoded = decode_transaction(&encode_transaction(&txn)).unwrap();
        assert_eq!(decoded.group(), Some(&[9u8; 32]));
        assert_eq!(decoded, txn);
    }

    #[test]
    fn test_asset_create_apar_keys() {
        let params = TxParams {
            tx_type: "acfg".to_string(),
            asset_config: Some(AssetConfigParams {
                asset_id: 0,
                total: 1_000_000,
                decimals: 6,
                unit_name: Some("FOO".to_string()),
                asset_name: Some("Foo Coin".to_string()),
                ..AssetConfigParams::default()
            }),
            payment: None,
            ..pay_params()
        };
        let txn = Transaction::from_params(&params).unwrap();
        let value = msgpack::decode(&encode_transaction(&txn)).unwrap();

        // caid elided for creation, apar present with sorted keys.
        assert!(value.get("caid").is_none());
        let apar = value.get("apar").unwrap();
        let keys: Vec<&str> = apar.as_map().unwrap().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["an", "dc", "t", "un"]);
    }

    #[test]
    fn test_box_reference_rewriting() {
        let params = TxParams {
            tx_type: "appl".to_string(),
            application_call: Some(ApplicationCallParams {
                app_id: 42,
                foreign_apps: vec![100, 200],
                boxes: vec![
                    BoxReferenceParams {
                        app_index: 100,
                        name: b"x".to_vec(),
                    },
                    BoxReferenceParams {
                        app_index: 0,
                        name: b"y".to_vec(),
                    },
                ],
                ..ApplicationCallParams::default()
            }),
            payment: None,
            ..pay_params()
        };
        let txn = Transaction::from_params(&params).unwrap();
        let value = msgpack::decode(&encode_transaction(&txn)).unwrap();

        let boxes = value.get("apbx").unwrap().as_array().unwrap();
        assert_eq!(boxes[0].get("i").and_then(Value::as_u64), Some(1));
        assert_eq!(boxes[0].get("n").and_then(Value::as_bytes), Some(&b"x"[..]));
        // i == 0 is elided entirely (default), leaving just the name.
        assert!(boxes[1].get("i").is_none());
        assert_eq!(boxes[1].get("n").and_then(Value::as_bytes), Some(&b"y"[..]));

        // Round-trip preserves the logical structure, with the called-app
        // form normalized to index 0.
        let decoded = decode_transaction(&encode_transaction(&txn)).unwrap();
        match decoded.payload() {
            TxPayload::ApplicationCall(fields) => {
                assert_eq!(fields.boxes[0].app_index, 100);
                assert_eq!(fields.boxes[1].app_index, 0);
            }
            other => panic!("wrong payload: {:?}", other),
        }
        assert_eq!(
            encode_transaction(&decoded),
            encode_transaction(&txn),
            "re-encoding after decode must be byte-identical"
        );
    }

    #[test]
    fn test_state_proof_fields_not_elided() {
        let params = TxParams {
            tx_type: "stpf".to_string(),
            sender: Address::ZERO.encode(),
            state_proof: Some(StateProofParams {
                state_proof_type: 0,
                state_proof: Vec::new(),
                message: Vec::new(),
            }),
            payment: None,
            ..pay_params()
        };
        let txn = Transaction::from_params(&params).unwrap();
        let value = msgpack::decode(&encode_transaction(&txn)).unwrap();
        // sp and spmsg stay present even when empty; sptype 0 is elided.
        assert!(value.get("sp").is_some());
        assert!(value.get("spmsg").is_some());
        assert!(value.get("sptype").is_none());
    }

    #[test]
    fn test_signed_envelope_key_order() {
        let txn = Transaction::from_params(&pay_params()).unwrap();
        let st = SignedTransaction {
            txn,
            sig: Some([5u8; 64]),
            msig: None,
            lsig: None,
            auth_address: Some(Address::new([7u8; 32])),
        };
        let keys = encoded_keys(&st.encode());
        assert_eq!(keys, ["sgnr", "sig", "txn"]);
    }

    #[test]
    fn test_signed_envelope_roundtrip() {
        let txn = Transaction::from_params(&pay_params()).unwrap();
        let st = SignedTransaction {
            txn,
            sig: Some([5u8; 64]),
            msig: Some(MultisigSignature {
                version: 1,
                threshold: 2,
                subsigs: vec![
                    MultisigSubsig {
                        public_key: [1u8; 32],
                        signature: Some([9u8; 64]),
                    },
                    MultisigSubsig {
                        public_key: [2u8; 32],
                        signature: None,
                    },
                ],
            }),
            lsig: None,
            auth_address: None,
        };
        let decoded = SignedTransaction::decode(&st.encode()).unwrap();
        assert_eq!(decoded, st);
    }

    #[test]
    fn test_multisig_record_key_order() {
        let msig = MultisigSignature {
            version: 1,
            threshold: 2,
            subsigs: vec![MultisigSubsig {
                public_key: [1u8; 32],
                signature: None,
            }],
        };
        let value = msgpack::decode(&encode_multisig(&msig)).unwrap();
        let keys: Vec<&str> = value.as_map().unwrap().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["subsig", "thr", "v"]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_transaction(b"not msgpack").is_err());
        assert!(decode_signed_transaction(&[0x81]).is_err());
    }
}
