//! # Node Sync
//!
//! Two nodes exchanging blocks through their RPC handlers, including a
//! fork that the receiving node must resolve by accumulated difficulty.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;

    use node_runtime::{NodeConfig, NodeContainer, RpcError};
    use mc_03_block_production::BlockError;
    use serde_json::{json, Value};

    fn node() -> NodeContainer {
        NodeContainer::new(&NodeConfig {
            production: config(8),
            ..NodeConfig::default()
        })
    }

    /// Copy every block of `from`'s canonical chain, oldest first, into `to`.
    fn relay(from: &NodeContainer, to: &NodeContainer) -> Vec<Value> {
        let blocks: Vec<Value> = {
            let chain = from.chain.read();
            let head = chain.canonical_head().map(|b| b.hash());
            head.map(|hash| {
                chain
                    .ancestors(&hash)
                    .into_iter()
                    .rev()
                    .map(|block| {
                        json!({
                            "block": block.header(),
                            "transactions": block.skeleton().transactions(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
        };
        let rpc = to.rpc();
        blocks
            .iter()
            .map(|body| rpc.dispatch("add_block", body).unwrap())
            .collect()
    }

    #[test]
    fn test_replica_follows_miner() {
        let miner = node();
        miner.bootstrap(3).unwrap();
        let replica = node();

        let receipts = relay(&miner, &replica);
        assert_eq!(receipts.len(), 4);
        assert!(receipts.iter().all(|r| r["is_head"] == json!(true)));
        assert_eq!(miner.rpc().get_latest_block(), replica.rpc().get_latest_block());
    }

    #[test]
    fn test_heavier_fork_wins() {
        let a = node();
        a.bootstrap(0).unwrap();
        let b = node();
        relay(&a, &b);

        // `a` extends by one block, `b` by two: `b`'s branch is heavier.
        a.mine_block(vec![], 10).unwrap();
        b.mine_block(vec![], 20).unwrap();
        b.mine_block(vec![], 21).unwrap();

        relay(&b, &a);
        let head_a = a.rpc().get_latest_block();
        let head_b = b.rpc().get_latest_block();
        assert_eq!(head_a, head_b);
        assert_eq!(head_a["block"]["skeleton"]["height"], json!(3));
        assert_eq!(a.chain.read().heads().count(), 2);
    }

    #[test]
    fn test_rejected_block_leaves_replica_unchanged() {
        let miner = node();
        miner.bootstrap(1).unwrap();
        let replica = node();

        let mut body = miner.rpc().get_latest_block();
        assert!(matches!(
            replica.rpc().add_block(&body),
            Err(RpcError::Rejected(BlockError::UnknownParent(_)))
        ));
        assert_eq!(replica.rpc().get_latest_block(), json!("None"));

        let genesis = {
            let chain = miner.chain.read();
            let head = chain.canonical_head().unwrap().hash();
            chain.ancestors(&head)[1].header()
        };
        replica
            .rpc()
            .add_block(&json!({ "block": genesis, "transactions": [] }))
            .unwrap();
        body["block"]["skeleton"]["state_root"] = json!(shared_crypto::Hash::ZERO);
        assert!(matches!(
            replica.rpc().add_block(&body),
            Err(RpcError::Rejected(BlockError::HeaderMismatch { .. }))
        ));
        assert_eq!(replica.chain.read().len(), 1);
    }
}
