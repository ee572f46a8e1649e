//! Deploy-account signing exchange sequences
//!
//! No recorded device exchanges exist for these flows; the logs are
//! assembled from the documented encoding rules with the recorded invoke
//! responses standing in for the device's final answer.

use ledger_starknet::apdu::felt::short_string_to_felt;
use ledger_starknet::apdu::tx::{
    DeployAccountFields, DeployAccountV1Fields, ResourceBound, ResourceBounds,
};
use ledger_starknet::transport::{RecordStore, ReplayTransport};
use ledger_starknet::{Felt, StarknetApp};

const PATH: &str = "m/2645'/1195502025'/1148870696'/0'/0'/0";

fn replay(log: &str) -> ReplayTransport {
    ReplayTransport::new(log.parse::<RecordStore>().unwrap())
}

#[tokio::test]
async fn sign_deploy_account_v3() -> anyhow::Result<()> {
    let log = concat!(
        "=> 5a0500001880000a55c741e9c9c47a6028800000008000000000000000\n",
        "<= 9000\n",
        "=> 5a050100c0000000000000000000000000000000000000000000000000000000000000000200000000000000000000000000000000000000000000000000534e5f4d41494e0000000000000000000000000000000000000000000000000000000000000001000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000030000000000000000000000000000000000000000000000000000000000000004\n",
        "<= 9000\n",
        "=> 5a05020060000000000000000000000000000000000000000000000000000000000000000000004c315f47415300000000000003ad00000000000000000005cff80d86108b00004c325f474153000000000000000000000000000000000000000000000000\n",
        "<= 9000\n",
        "=> 5a05030000\n",
        "<= 9000\n",
        "=> 5a050400200000000000000000000000000000000000000000000000000000000000000001\n",
        "<= 9000\n",
        "=> 5a050500200000000000000000000000000000000000000000000000000000000000000006\n",
        "<= 049274bcd122824a235c9c43a43e91155b37fa041aace120012153ab7aba7ecd41070c0616a76411b2e85a03c57332eb03a4939207d626e78c469ea93bec12ed7903340d421ce8424ce71a2b030c918722261e59b9b820eafb31cdc39d4c2c1a2d009000\n",
    );

    let fields = DeployAccountFields {
        contract_address: Felt::from(2u64),
        class_hash: Felt::from(3u64),
        contract_address_salt: Felt::from(4u64),
        constructor_calldata: vec![Felt::from(6u64)],
        tip: Felt::ZERO,
        resource_bounds: ResourceBounds {
            l1_gas: ResourceBound {
                max_amount: 0x3ad,
                max_price_per_unit: 0x5cff80d86108b,
            },
            l2_gas: ResourceBound::default(),
        },
        paymaster_data: vec![],
        chain_id: short_string_to_felt("SN_MAIN")?,
        nonce: Felt::from(1u64),
        ..Default::default()
    };

    let app = StarknetApp::new(replay(log));
    let tx = app.sign_deploy_account(&PATH.parse()?, &fields).await?;

    assert_eq!(
        hex::encode(tx.hash).trim_start_matches('0'),
        "49274bcd122824a235c9c43a43e91155b37fa041aace120012153ab7aba7ecd"
    );
    assert_eq!(
        hex::encode(tx.signature.r).trim_start_matches('0'),
        "70c0616a76411b2e85a03c57332eb03a4939207d626e78c469ea93bec12ed79"
    );
    assert_eq!(tx.signature.v, 0);

    Ok(())
}

#[tokio::test]
async fn sign_deploy_account_v1() -> anyhow::Result<()> {
    let log = concat!(
        "=> 5a0600001880000a55c741e9c9c47a6028800000008000000000000000\n",
        "<= 9000\n",
        "=> 5a060100a000000000000000000000000000000000000000000000000000000000000000020000000000000000000000000000000000000000000000000000000000000003000000000000000000000000000000000000000000000000000000000000000400000000000000000000000000000000000000000000000000534e5f4d41494e0000000000000000000000000000000000000000000000000000000000000001\n",
        "<= 9000\n",
        "=> 5a060200200000000000000000000000000000000000000000000000000000000000000005\n",
        "<= 9000\n",
        "=> 5a060300200000000000000000000000000000000000000000000000000000000000000002\n",
        "<= 9000\n",
        "=> 5a0604004000000000000000000000000000000000000000000000000000000000000000060000000000000000000000000000000000000000000000000000000000000007\n",
        "<= 062d7552814015c9820754f15df1196b220356d7fa812a411d439047c9ab0bce410288bf2ffdbc7a81c8a3749d6bc8ef0877d9bb3251a1d6010eaa3326ab367c61033d8448aadad62cf67f52e611e8aebc9b152691dfbb46988730491b80cf7e22019000\n",
    );

    let fields = DeployAccountV1Fields {
        contract_address: Felt::from(2u64),
        class_hash: Felt::from(3u64),
        contract_address_salt: Felt::from(4u64),
        constructor_calldata: vec![Felt::from(6u64), Felt::from(7u64)],
        max_fee: Felt::from(5u64),
        chain_id: short_string_to_felt("SN_MAIN")?,
        nonce: Felt::from(1u64),
    };

    let app = StarknetApp::new(replay(log));
    let tx = app.sign_deploy_account_v1(&PATH.parse()?, &fields).await?;

    assert_eq!(
        hex::encode(tx.hash).trim_start_matches('0'),
        "62d7552814015c9820754f15df1196b220356d7fa812a411d439047c9ab0bce"
    );
    assert_eq!(
        hex::encode(tx.signature.s).trim_start_matches('0'),
        "33d8448aadad62cf67f52e611e8aebc9b152691dfbb46988730491b80cf7e22"
    );
    assert_eq!(tx.signature.v, 1);

    Ok(())
}
