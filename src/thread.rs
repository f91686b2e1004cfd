//! A single thread of execution over one decoded script.

use crate::error::RunError;
use crate::script::Script;
use crate::symbol::SymbolTable;
use crate::vm::{Engine, ExecContext, ExecutionResult, MAX_LOCALS};
use log::{debug, log_enabled, Level};

/// Runs one script against an [`Engine`]. The thread owns its locals and
/// the instruction pointer; globals live in the engine.
pub struct Thread<'s> {
    script: &'s Script,
    /// Index into `script.code`, not a byte address
    ip: usize,
    locals: [i16; MAX_LOCALS],
    /// Names for trace output only; never consulted for execution
    symbols: SymbolTable,
    executed: u64,
}

impl<'s> Thread<'s> {
    pub fn new(script: &'s Script) -> Self {
        Thread {
            script,
            ip: 0,
            locals: [0; MAX_LOCALS],
            symbols: SymbolTable::with_defaults(),
            executed: 0,
        }
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn locals(&self) -> &[i16; MAX_LOCALS] {
        &self.locals
    }

    pub fn locals_mut(&mut self) -> &mut [i16; MAX_LOCALS] {
        &mut self.locals
    }

    /// Instructions executed so far
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// Execute the instruction at `ip` and move `ip` accordingly. After a
    /// `Stop` the pointer stays on the stopping instruction.
    pub fn step(&mut self, engine: &mut Engine) -> Result<ExecutionResult, RunError> {
        let script = self.script;
        let inst = script
            .code
            .get(self.ip)
            .ok_or(RunError::RanOffEnd { ip: self.ip })?;

        if log_enabled!(Level::Debug) {
            debug!(
                "[{}] {:04X}: {}",
                script.id,
                inst.address(),
                inst.display(&mut self.symbols)
            );
        }

        let result = {
            let mut ctx = ExecContext::new(engine, &mut self.locals);
            inst.execute(&mut ctx)?
        };
        self.executed += 1;

        match result {
            ExecutionResult::Continue => self.ip += 1,
            ExecutionResult::Jump(address) => {
                self.ip = script
                    .index_of(address)
                    .ok_or(RunError::InvalidJumpTarget { address })?;
            }
            ExecutionResult::Stop => {}
        }
        Ok(result)
    }

    /// Step until the script stops or an error ends the thread.
    pub fn run(&mut self, engine: &mut Engine) -> Result<(), RunError> {
        let limit = engine.options().max_instructions;
        loop {
            if let Some(limit) = limit {
                if self.executed >= limit {
                    return Err(RunError::InstructionLimit { limit });
                }
            }
            if self.step(engine)? == ExecutionResult::Stop {
                debug!(
                    "script {} stopped after {} instructions",
                    self.script.id, self.executed
                );
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunOptions;
    use test_log::test;

    fn script(bytes: &[u8]) -> Script {
        Script::decode(1, bytes.to_vec()).unwrap()
    }

    #[test]
    fn counting_loop() {
        // VAR_100 = 0
        // loop: VAR_100++; Unless (VAR_100 == 3) Goto loop
        // StopObjectCode
        let s = script(&[
            0x1A, 0x64, 0x00, 0x00, 0x00, // 0000
            0x46, 0x64, 0x00, // 0005
            0x48, 0x64, 0x00, 0x03, 0x00, 0xF6, 0xFF, // 0008
            0x00, // 000F
        ]);
        let mut engine = Engine::new();
        engine.run(&s).unwrap();
        assert_eq!(engine.word(100), Some(3));
    }

    #[test]
    fn running_off_the_end_is_an_error() {
        let s = script(&[0x80]);
        let mut engine = Engine::new();
        let mut thread = Thread::new(&s);
        assert_eq!(
            thread.step(&mut engine),
            Ok(ExecutionResult::Continue)
        );
        assert_eq!(thread.ip(), 1);
        assert_eq!(
            thread.run(&mut engine),
            Err(RunError::RanOffEnd { ip: 1 })
        );
    }

    #[test]
    fn jump_into_an_instruction_fails() {
        let s = script(&[0x18, 0x01, 0x00, 0x1A, 0x05, 0x00, 0x2A, 0x00, 0x00]);
        let mut engine = Engine::new();
        assert_eq!(
            engine.run(&s),
            Err(RunError::InvalidJumpTarget { address: 4 })
        );
    }

    #[test]
    fn stop_leaves_ip_in_place() {
        let s = script(&[0x80, 0x00]);
        let mut engine = Engine::new();
        let mut thread = Thread::new(&s);
        thread.run(&mut engine).unwrap();
        assert_eq!(thread.ip(), 1);
        assert_eq!(thread.executed(), 2);
    }

    #[test]
    fn instruction_limit_stops_endless_loops() {
        // Goto back to itself
        let s = script(&[0x18, 0xFD, 0xFF]);
        let mut engine = Engine::with_options(RunOptions {
            max_instructions: Some(50),
            random_seed: None,
        });
        assert_eq!(
            engine.run(&s),
            Err(RunError::InstructionLimit { limit: 50 })
        );
    }

    #[test]
    fn locals_belong_to_the_thread() {
        // LOCAL_2 = 9
        let s = script(&[0x1A, 0x02, 0x40, 0x09, 0x00, 0x00]);
        let mut engine = Engine::new();
        let mut thread = Thread::new(&s);
        thread.run(&mut engine).unwrap();
        assert_eq!(thread.locals()[2], 9);
        assert!(engine.words().iter().all(|&w| w == 0));
    }

    #[test]
    fn unsupported_execution_is_reported() {
        // StopMusic
        let s = script(&[0x20, 0x00]);
        let mut engine = Engine::new();
        assert_eq!(
            engine.run(&s),
            Err(RunError::MissingExecuteBehavior {
                mnemonic: "StopMusic"
            })
        );
    }
}
