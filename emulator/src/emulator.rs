
use common::asm::{Ins, Opcode, Reg};
use common::constants::MEM_SIZE;
use crate::alu::{AluOp, AluRet};
use crate::io::{Printer, StdoutPrinter};
use crate::{EmulatorState, Fault};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use derive_more::IsVariant;
use log::{debug, error, info, trace};
use num_traits::ToPrimitive;


#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum HaltReason {
    Hlt,
    DivideByZero,
    // The pc ran (or jumped) past the last byte of memory.
    EndOfMemory,
    Cancelled,
    InsLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum ExecRet {
    Ok,
    Halt(HaltReason),
}

#[derive(Debug, Clone, PartialEq, Eq, IsVariant)]
pub enum RunState {
    Running,
    Halted(HaltReason),
    Faulted(Fault),
}

// What happens to the pc once an instruction is done. Exactly one of these is
// applied per instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Next {
    Advance,
    Jump(i64),
    Halt(HaltReason),
}

fn reg(operand: u8) -> Result<Reg, Fault> {
    Reg::from_operand(operand).ok_or(Fault::InvalidRegister(operand))
}


pub struct Emulator {
    state: EmulatorState,
    printer: Arc<dyn Printer>,
    run_state: RunState,
    cancel: Option<Arc<AtomicBool>>,
    ins_limit: Option<usize>,
}

impl Emulator {
    pub fn new() -> Emulator {
        Emulator::with_printer(Arc::new(StdoutPrinter::default()))
    }

    pub fn with_printer(printer: Arc<dyn Printer>) -> Emulator {
        Emulator {
            state: EmulatorState::new(),
            printer,
            run_state: RunState::Running,
            cancel: None,
            ins_limit: None,
        }
    }

    // Checked once per instruction; setting it stops the run.
    pub fn set_cancel_flag(&mut self, cancel: Arc<AtomicBool>) {
        self.cancel = Some(cancel);
    }

    // Stop once this many instructions have executed in total.
    pub fn set_ins_limit(&mut self, limit: Option<usize>) {
        self.ins_limit = limit;
    }

    // Run until a halt or a fault.
    pub fn run(&mut self) -> Result<HaltReason, Fault> {
        loop {
            if let ExecRet::Halt(reason) = self.step()? {
                return Ok(reason);
            }
        }
    }

    pub fn run_at(&mut self, pc: usize) -> Result<HaltReason, Fault> {
        self.state.set_pc(pc);
        self.run_state = RunState::Running;
        self.run()
    }

    // Run a single instruction. Once halted or faulted, keeps returning that.
    pub fn step(&mut self) -> Result<ExecRet, Fault> {
        match &self.run_state {
            RunState::Running => {},
            RunState::Halted(reason) => return Ok(ExecRet::Halt(*reason)),
            RunState::Faulted(fault) => return Err(fault.clone()),
        }

        match self.cycle() {
            Ok(None) => Ok(ExecRet::Ok),
            Ok(Some(reason)) => {
                info!("Halted ({reason:?}) at pc {:#04x} after {} instructions",
                    self.state.pc(), self.state.num_ins());
                self.run_state = RunState::Halted(reason);
                Ok(ExecRet::Halt(reason))
            },
            Err(fault) => {
                error!("Fault at pc {:#04x}: {fault}", self.state.pc());
                self.run_state = RunState::Faulted(fault.clone());
                Err(fault)
            },
        }
    }

    pub fn run_state(&self) -> &RunState {
        &self.run_state
    }

    pub fn load_image(&mut self, data: &[u8], start: usize) -> Result<(), Fault> {
        let end = match start.checked_add(data.len()) {
            Some(end) if end <= MEM_SIZE => end,
            // Report the first byte that doesn't fit.
            _ => {
                let first = start.max(MEM_SIZE);
                return Err(Fault::AddressOutOfRange(i64::try_from(first).unwrap_or(i64::MAX)));
            },
        };
        for (byte, ptr) in data.iter().zip(start..end) {
            self.state.mem_write(ptr as i64, *byte as i64)?;
        }
        Ok(())
    }

    pub fn get_state(&self) -> &EmulatorState {
        &self.state
    }

    pub fn get_state_mut(&mut self) -> &mut EmulatorState {
        &mut self.state
    }

    pub fn reg_read(&self, reg: Reg) -> i64 {
        self.state.reg_read(reg)
    }


    ///////////////////////////////////////////////////////////////////////////
    // Execute
    ///////////////////////////////////////////////////////////////////////////

    fn stop_reason(&self) -> Option<HaltReason> {
        if self.cancel.as_ref().is_some_and(|c| c.load(Ordering::Relaxed)) {
            return Some(HaltReason::Cancelled);
        }
        if self.ins_limit.is_some_and(|limit| self.state.num_ins() >= limit) {
            return Some(HaltReason::InsLimit);
        }
        if self.state.pc() >= MEM_SIZE {
            return Some(HaltReason::EndOfMemory);
        }
        None
    }

    fn cycle(&mut self) -> Result<Option<HaltReason>, Fault> {
        if let Some(reason) = self.stop_reason() {
            return Ok(Some(reason));
        }

        let pc = self.state.pc();
        let ins = self.state.next_ins()?;
        trace!("{}", self.state.trace_line());
        debug!("PC: {pc:#04x}: {ins}");
        self.state.inc_ins();

        match self.exec(&ins)? {
            Next::Advance => self.state.set_pc(pc + ins.size()),
            Next::Jump(target) => {
                debug_assert!(ins.op.is_some_and(Opcode::sets_pc), "{ins} set the pc");
                let target = target.to_usize().ok_or(Fault::AddressOutOfRange(target))?;
                self.state.set_pc(target);
            },
            Next::Halt(reason) => return Ok(Some(reason)),
        }
        Ok(None)
    }

    fn exec_alu(&mut self, op: Opcode, ins: &Ins) -> Result<Next, Fault> {
        let alu_op = AluOp::try_from(op)?;
        debug_assert!(op.uses_alu(), "{op} sent to the ALU");

        let a = reg(ins.operand_a())?;
        let b = reg(ins.operand_b())?;
        if self.state.alu(alu_op, a, b)? == AluRet::DivideByZero {
            return Ok(Next::Halt(HaltReason::DivideByZero));
        }

        if alu_op == AluOp::Mul {
            self.printer.print(self.state.reg_read(a));
        }
        Ok(Next::Advance)
    }

    fn exec_call(&mut self, ins: &Ins) -> Result<Next, Fault> {
        let target = reg(ins.operand_a())?;
        let ret = self.state.pc() + ins.size();
        self.state.push(ret as i64)?;
        // Read after the push, so "call sp" sees the new stack pointer.
        Ok(Next::Jump(self.state.reg_read(target)))
    }

    fn exec_branch(&self, ins: &Ins, taken: bool) -> Result<Next, Fault> {
        if !taken {
            return Ok(Next::Advance);
        }
        Ok(Next::Jump(self.state.reg_read(reg(ins.operand_a())?)))
    }

    fn exec(&mut self, ins: &Ins) -> Result<Next, Fault> {
        let Some(op) = ins.op else {
            debug!("Skipping unknown opcode {:#04x}", ins.raw);
            return Ok(Next::Advance);
        };

        let equal = self.state.get_flags().get_equal();
        let next = match op {
            Opcode::Hlt => Next::Halt(HaltReason::Hlt),
            Opcode::Ldi => {
                self.state.reg_write(reg(ins.operand_a())?, ins.operand_b() as i64);
                Next::Advance
            },
            Opcode::Ld => {
                let val = self.state.reg_read(reg(ins.operand_b())?);
                self.state.reg_write(reg(ins.operand_a())?, val);
                Next::Advance
            },
            Opcode::Prn => {
                self.printer.print(self.state.reg_read(reg(ins.operand_a())?));
                Next::Advance
            },
            Opcode::Push => {
                let val = self.state.reg_read(reg(ins.operand_a())?);
                self.state.push(val)?;
                Next::Advance
            },
            Opcode::Pop => {
                let dst = reg(ins.operand_a())?;
                let val = self.state.pop()?;
                self.state.reg_write(dst, val);
                Next::Advance
            },
            Opcode::Call => self.exec_call(ins)?,
            Opcode::Ret => Next::Jump(self.state.pop()?),
            Opcode::Jmp => self.exec_branch(ins, true)?,
            Opcode::Jeq => self.exec_branch(ins, equal)?,
            Opcode::Jne => self.exec_branch(ins, !equal)?,
            Opcode::Add | Opcode::Mul | Opcode::And | Opcode::Mod | Opcode::Div
                | Opcode::Cmp | Opcode::Inc | Opcode::Dec => self.exec_alu(op, ins)?,
        };
        Ok(next)
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}
